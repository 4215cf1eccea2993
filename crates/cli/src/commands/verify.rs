// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rk verify`: count lines by decode outcome

use crate::output::{print, OutputFormat};
use clap::Args;
use rk_core::{decode, CodecError};
use rk_storage::LogReader;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct VerifyArgs {
    /// Path to the append log
    pub log: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub lines: u64,
    pub valid: u64,
    pub corrupt_entry: u64,
    pub decompression_failed: u64,
    pub malformed_record: u64,
}

impl VerifyReport {
    pub fn failed(&self) -> u64 {
        self.corrupt_entry + self.decompression_failed + self.malformed_record
    }

    fn record(&mut self, result: Result<(), CodecError>) {
        self.lines += 1;
        match result {
            Ok(()) => self.valid += 1,
            Err(CodecError::CorruptEntry(_)) => self.corrupt_entry += 1,
            Err(CodecError::DecompressionFailed(_)) => self.decompression_failed += 1,
            // Encode never comes out of decode
            Err(CodecError::MalformedRecord(_) | CodecError::Encode(_)) => {
                self.malformed_record += 1
            }
        }
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "lines:                {}", self.lines)?;
        writeln!(f, "valid:                {}", self.valid)?;
        writeln!(f, "corrupt_entry:        {}", self.corrupt_entry)?;
        writeln!(f, "decompression_failed: {}", self.decompression_failed)?;
        write!(f, "malformed_record:     {}", self.malformed_record)
    }
}

/// Decode every non-empty line of the log
pub fn tally(reader: &LogReader) -> anyhow::Result<VerifyReport> {
    let mut report = VerifyReport::default();
    for line in reader.lines()? {
        let line = line?;
        report.record(decode(&line.bytes).map(|_| ()));
    }
    Ok(report)
}

pub fn handle(args: VerifyArgs) -> anyhow::Result<()> {
    let reader = LogReader::new(&args.log);
    if !reader.path().exists() {
        anyhow::bail!("log not found: {}", args.log.display());
    }

    let report = tally(&reader)?;
    print(&report, args.format);

    if report.failed() > 0 {
        anyhow::bail!("{} of {} lines failed to decode", report.failed(), report.lines);
    }
    Ok(())
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
