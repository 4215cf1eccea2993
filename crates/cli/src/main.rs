// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rk - Record Keeper log tools
//!
//! Works directly on an append log file; no daemon required.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{inspect, verify};

#[derive(Parser)]
#[command(name = "rk", version, about = "Record Keeper - append log tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the records in a log
    Inspect(inspect::InspectArgs),
    /// Check that every line in a log decodes
    Verify(verify::VerifyArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(args) => inspect::handle(args),
        Commands::Verify(args) => verify::handle(args),
    }
}
