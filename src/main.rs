// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;

use rankc::build::run_derive;
use rankc::logging::{init_subscriber, Verbosity};

mod cli;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_subscriber(Verbosity::from_flags(cli.verbose, cli.quiet), cli.no_color);

    let result = match cli.command {
        Commands::Derive {
            input,
            output,
            threads,
        } => run_derive(&input, &output, threads).map(|summary| {
            for warning in &summary.warnings {
                eprintln!("⚠️  {}", warning);
            }
            eprintln!(
                "✓ Derived {} rank profiles across {} schemas ({})",
                summary.profiles,
                summary.schemas,
                cli::display::format_size(summary.bytes_written)
            );
            for dir in &summary.output_dirs {
                eprintln!("  → {}", dir.display());
            }
        }),
        Commands::Inspect { file, stripped } => cli::inspect::run_inspect(&file, stripped),
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}
