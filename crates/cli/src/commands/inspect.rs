// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rk inspect`: dump decodable records

use crate::output::{print_item, OutputFormat};
use clap::Args;
use rk_core::{decode, Record};
use rk_storage::LogReader;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectArgs {
    /// Path to the append log
    pub log: PathBuf,

    /// Only show records in this topic
    #[arg(long)]
    pub topic: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// One decoded log line
#[derive(Serialize)]
struct Entry {
    line: u64,
    #[serde(flatten)]
    record: Record,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6}  {:<24} created={} updated={}  {}",
            self.line,
            self.record.id(),
            self.record.created_at,
            self.record.updated_at,
            self.record.content
        )
    }
}

pub fn handle(args: InspectArgs) -> anyhow::Result<()> {
    let reader = LogReader::new(&args.log);
    if !reader.path().exists() {
        anyhow::bail!("log not found: {}", args.log.display());
    }

    for line in reader.lines()? {
        let line = line?;
        match decode(&line.bytes) {
            Ok(record) => {
                if args.topic.as_ref().is_some_and(|t| *t != record.topic) {
                    continue;
                }
                print_item(
                    &Entry {
                        line: line.number,
                        record,
                    },
                    args.format,
                );
            }
            Err(e) => eprintln!("line {}: {}: {}", line.number, e.kind(), e),
        }
    }
    Ok(())
}
