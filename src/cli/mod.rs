// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the rankc command-line interface.
//!
//! Two subcommands: `derive` compiles a deployment manifest into property bag
//! blobs plus exported config, `inspect` opens a single blob and prints its
//! framing and properties.

pub mod display;
pub mod inspect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rankc",
    about = "Compiles rank profiles into FEF property bags",
    version
)]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Derive every rank profile of a deployment manifest
    Derive {
        /// Deployment manifest (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory, one subdirectory per schema
        #[arg(short, long)]
        output: PathBuf,

        /// Worker threads (0 = all CPUs); overrides the manifest
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Inspect a .fef property bag
    Inspect {
        /// Path to .fef file
        file: PathBuf,

        /// Show keys as the engine sees them (without .partN suffixes)
        #[arg(long)]
        stripped: bool,
    },
}
