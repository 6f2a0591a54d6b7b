//! Tests for batch-parallel derivation.
//!
//! The thread count must never show up in the output: blobs, their order and
//! the warnings are identical for every pool size.

use rankc::build::{DeriveOptions, RankProfileList, WorkerPool};
use rankc::model::{QueryProfileTypes, RankProfileRegistry, RankType};
use rankc::testing::{independent_profiles, make_child, make_schema, profile_with_first_phase, rank_type};
use rankc::DeriveError;

fn global_registry(n: usize) -> RankProfileRegistry {
    let mut registry = RankProfileRegistry::new();
    for profile in independent_profiles(n) {
        registry.add(profile);
    }
    registry
}

fn derive_globals(registry: &RankProfileRegistry, threads: usize) -> RankProfileList {
    let pool = WorkerPool::new(threads).unwrap();
    RankProfileList::derive(
        None,
        registry,
        &QueryProfileTypes::new(),
        &pool,
        &DeriveOptions::default(),
    )
    .unwrap()
}

fn blobs(list: &RankProfileList) -> Vec<(String, Vec<u8>)> {
    list.profiles()
        .map(|p| (p.name().to_string(), p.blob().to_vec()))
        .collect()
}

#[test]
fn test_independent_profiles_all_derived() {
    for n in [1, 4, 50] {
        let registry = global_registry(n);
        let list = derive_globals(&registry, 4);
        assert_eq!(list.len(), n);
        for raw in list.profiles() {
            let properties = raw.decode().unwrap();
            assert_eq!(properties.len(), raw.property_count());
            assert!(properties
                .iter()
                .any(|(k, _)| k == "rankingExpression(boost).rankingScript"));
        }
    }
}

#[test]
fn test_output_independent_of_thread_count() {
    for n in [1, 4, 50] {
        let registry = global_registry(n);
        let sequential = blobs(&derive_globals(&registry, 1));
        assert_eq!(sequential.len(), n);
        for threads in [4, 8] {
            let parallel = blobs(&derive_globals(&registry, threads));
            assert_eq!(sequential, parallel, "n={} threads={}", n, threads);
        }
    }
}

#[test]
fn test_profiles_listed_in_derivation_order() {
    let mut registry = RankProfileRegistry::new();
    registry.add_schema("music", None);
    registry.add(profile_with_first_phase("zeta", "nativeRank"));
    let mut base = make_child("base", Some("music"), &[]);
    base.rank_settings = vec![rank_type("title", RankType::Identity)];
    registry.add(base);
    for name in ["c3", "c1", "c2"] {
        registry.add(make_child(name, Some("music"), &["base"]));
    }

    let schema = make_schema("music", &[]);
    let pool = WorkerPool::new(8).unwrap();
    let list = RankProfileList::derive(
        Some(&schema),
        &registry,
        &QueryProfileTypes::new(),
        &pool,
        &DeriveOptions::default(),
    )
    .unwrap();

    let names: Vec<&str> = list.profiles().map(|p| p.name()).collect();
    assert_eq!(names, vec!["default", "base", "c1", "c2", "c3"]);
    assert_eq!(list.schema(), Some("music"));
}

#[test]
fn test_failure_in_batch_fails_everything() {
    let mut registry = global_registry(20);
    let mut bad = profile_with_first_phase("profile_bad", "f(1)");
    bad.functions = vec![rankc::testing::function("f", &["x"], "f(x)")];
    registry.add(bad);

    let pool = WorkerPool::new(8).unwrap();
    let result = RankProfileList::derive(
        None,
        &registry,
        &QueryProfileTypes::new(),
        &pool,
        &DeriveOptions::default(),
    );
    assert!(matches!(result, Err(DeriveError::RecursiveFunction { .. })));
}

#[test]
fn test_run_batch_preserves_input_order() {
    let pool = WorkerPool::new(8).unwrap();
    let items: Vec<usize> = (0..1000).collect();
    let doubled = pool.run_batch(&items, |i| i * 2);
    assert_eq!(doubled, (0..1000).map(|i| i * 2).collect::<Vec<_>>());
}

#[test]
fn test_zero_threads_means_all_cpus() {
    let pool = WorkerPool::new(0).unwrap();
    assert!(pool.threads() >= 1);
    assert_eq!(WorkerPool::sequential().unwrap().threads(), 1);
}
