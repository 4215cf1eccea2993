// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a single value
pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print one item per line; JSON output is one compact object per line
pub fn print_item<T: Serialize + std::fmt::Display>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", item),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(item) {
                println!("{}", json);
            }
        }
    }
}
