// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Rank profile compiler.
//!
//! Turns a schema's rank profiles (inheritable bundles of ranking
//! expressions, tuning knobs and per-field settings) into the flat, ordered,
//! compressed property bags the ranking engine (FEF) consumes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌───────────────┐   ┌────────────┐
//! │    model     │──▶│ build::order  │──▶│ build::list   │──▶│   config   │
//! │ (profiles,   │   │ (inheritance  │   │ (batches on a │   │ (exported  │
//! │  registry)   │   │  batches)     │   │  worker pool) │   │  artifacts)│
//! └──────────────┘   └───────────────┘   └───────┬───────┘   └────────────┘
//!                                                │
//!                                                ▼
//!                    ┌───────────────┐   ┌───────────────┐   ┌────────────┐
//!                    │  expression   │◀──│    derive     │──▶│   codec    │
//!                    │ (parse/print) │   │ (one profile) │   │ (blob)     │
//!                    └───────────────┘   └───────┬───────┘   └────────────┘
//!                                                │
//!                                                ▼
//!                                        ┌───────────────┐
//!                                        │    native     │
//!                                        │ (rank types)  │
//!                                        └───────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use rankc::build::{DeriveOptions, RankProfileList, WorkerPool};
//!
//! let registry = manifest.registry();
//! let pool = WorkerPool::new(0)?;
//! let list = RankProfileList::derive(
//!     Some(&schema), &registry, &query_types, &pool, &DeriveOptions::default(),
//! )?;
//! for profile in list.profiles() {
//!     println!("{}: {} properties", profile.name(), profile.property_count());
//! }
//! ```

pub mod build;
pub mod codec;
pub mod config;
pub mod derive;
pub mod error;
pub mod expression;
pub mod logging;
pub mod model;
pub mod native;
pub mod testing;

pub use build::{
    plan, run_derive, DeploymentManifest, DeriveOptions, ProfileOrderer, RankProfileList,
    RawRankProfile, WorkerPool,
};
pub use codec::{decode_properties, encode_properties, Property};
pub use config::{ConfigArtifact, ConfigKind};
pub use derive::{derive_profile, DeriveContext, DerivedProfile};
pub use error::{CodecError, DeriveError, DeriveWarning, ExpressionError, StuckProfile};
pub use expression::ExpressionNode;
pub use model::{
    AttributeFields, QueryProfileTypes, RankProfile, RankProfileRegistry, RankType, Schema,
};
pub use native::{NativeRankTypeDefinitionSet, NativeTable, NativeTableType};
