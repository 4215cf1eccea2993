// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log-line codec
//!
//! A record becomes one line of text in three layers:
//!
//! ```text
//! Record → JSON (field-tagged) → gzip → base64 (standard alphabet)
//! ```
//!
//! Decoding peels the layers in reverse and reports which layer rejected the
//! input, so replay can tell a torn write from a bad payload.

use crate::record::Record;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use thiserror::Error;

/// Errors produced by the codec, one per layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The text-safe layer rejected the input
    #[error("corrupt entry: {0}")]
    CorruptEntry(String),
    /// The compressed layer is invalid or truncated
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),
    /// The structured layer could not be parsed into a valid record
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

impl CodecError {
    /// Stable short name of the failing layer, used in logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::CorruptEntry(_) => "corrupt_entry",
            CodecError::DecompressionFailed(_) => "decompression_failed",
            CodecError::MalformedRecord(_) => "malformed_record",
            CodecError::Encode(_) => "encode",
        }
    }
}

/// Encode a record into a single line of text (without the line separator)
pub fn encode(record: &Record) -> Result<String, CodecError> {
    let json = serde_json::to_vec(record).map_err(|e| CodecError::Encode(e.to_string()))?;

    let mut encoder = GzEncoder::new(Vec::with_capacity(json.len()), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    Ok(STANDARD.encode(compressed))
}

/// Decode one log line back into a record
///
/// Surrounding ASCII whitespace (including a trailing `\r\n`) is ignored.
pub fn decode(line: impl AsRef<[u8]>) -> Result<Record, CodecError> {
    let text = line.as_ref().trim_ascii();
    if text.is_empty() {
        return Err(CodecError::CorruptEntry("empty line".to_string()));
    }

    let compressed = STANDARD
        .decode(text)
        .map_err(|e| CodecError::CorruptEntry(e.to_string()))?;

    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| CodecError::DecompressionFailed(e.to_string()))?;

    let record: Record =
        serde_json::from_slice(&json).map_err(|e| CodecError::MalformedRecord(e.to_string()))?;
    if !record.is_valid() {
        return Err(CodecError::MalformedRecord("empty key".to_string()));
    }

    Ok(record)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
