// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! mpflow CLI
//!
//! Computes the self-timed schedule of a dataflow model described in JSON
//! and prints it as occupancy traces, firing intervals or JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod run;

#[derive(Parser, Debug)]
#[command(author, version, about = "Self-timed (max,+) schedules for dataflow models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the fixpoint schedule of a model and print it.
    Run(run::RunArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run::run(&args, &mut std::io::stdout().lock()),
    }
}
