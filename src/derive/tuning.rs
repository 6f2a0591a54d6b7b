// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Tuning and match-phase properties.

use super::properties::PropertyList;
use crate::error::DeriveError;
use crate::model::{MatchPhaseSettings, Tuning};

pub const HEAP_SIZE: &str = "vespa.hitcollector.heapsize";
pub const ARRAY_SIZE: &str = "vespa.hitcollector.arraysize";
pub const RANK_SCORE_DROP_LIMIT: &str = "vespa.hitcollector.rankscoredroplimit";
pub const NUM_THREADS_PER_SEARCH: &str = "vespa.matching.numthreadspersearch";
pub const MIN_HITS_PER_THREAD: &str = "vespa.matching.minhitsperthread";
pub const NUM_SEARCH_PARTITIONS: &str = "vespa.matching.numsearchpartitions";
pub const TERMWISE_LIMIT: &str = "vespa.matching.termwise_limit";

const DEGRADATION: &str = "vespa.matchphase.degradation";
const DIVERSITY: &str = "vespa.matchphase.diversity";

/// Doubles always carry a fractional part: `10` prints as `10.0`.
pub fn format_double(value: f64) -> String {
    format!("{:?}", value)
}

/// Emit the tuning knobs that differ from "unset".
pub fn emit_tuning(out: &mut PropertyList, tuning: &Tuning) -> Result<(), DeriveError> {
    if let Some(rerank) = tuning.rerank_count.filter(|v| *v >= 0) {
        out.push(HEAP_SIZE, rerank.to_string())?;
    }
    if let Some(keep) = tuning.keep_rank_count.filter(|v| *v >= 0) {
        out.push(ARRAY_SIZE, keep.to_string())?;
    }
    if let Some(limit) = tuning.rank_score_drop_limit.filter(|v| *v > -f64::MAX) {
        out.push(RANK_SCORE_DROP_LIMIT, format_double(limit))?;
    }
    if let Some(threads) = tuning.num_threads_per_search.filter(|v| *v > 0) {
        out.push(NUM_THREADS_PER_SEARCH, threads.to_string())?;
    }
    if let Some(hits) = tuning.min_hits_per_thread.filter(|v| *v > 0) {
        out.push(MIN_HITS_PER_THREAD, hits.to_string())?;
    }
    if let Some(partitions) = tuning.num_search_partitions.filter(|v| *v >= 0) {
        out.push(NUM_SEARCH_PARTITIONS, partitions.to_string())?;
    }
    if let Some(limit) = tuning.termwise_limit.filter(|v| *v < 1.0) {
        out.push(TERMWISE_LIMIT, format_double(limit))?;
    }
    Ok(())
}

/// Emit match-phase degradation and, nested in it, diversity.
pub fn emit_match_phase(
    out: &mut PropertyList,
    settings: &MatchPhaseSettings,
) -> Result<(), DeriveError> {
    out.push(format!("{}.attribute", DEGRADATION), settings.attribute.as_str())?;
    out.push(
        format!("{}.ascendingorder", DEGRADATION),
        settings.ascending.to_string(),
    )?;
    out.push(format!("{}.maxhits", DEGRADATION), settings.max_hits.to_string())?;
    out.push(
        format!("{}.maxfiltercoverage", DEGRADATION),
        format_double(settings.max_filter_coverage),
    )?;
    out.push(
        format!("{}.samplepercentage", DEGRADATION),
        format_double(settings.evaluation_point),
    )?;
    out.push(
        format!("{}.postfiltermultiplier", DEGRADATION),
        format_double(settings.post_filter_multiplier),
    )?;

    if let Some(ref diversity) = settings.diversity {
        out.push(format!("{}.attribute", DIVERSITY), diversity.attribute.as_str())?;
        out.push(
            format!("{}.mingroups", DIVERSITY),
            diversity.min_groups.to_string(),
        )?;
        out.push(
            format!("{}.cutoff.factor", DIVERSITY),
            format_double(diversity.cutoff_factor),
        )?;
        out.push(
            format!("{}.cutoff.strategy", DIVERSITY),
            diversity.cutoff_strategy.name(),
        )?;
    }
    Ok(())
}
