// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-framed append log
//!
//! One line per record write. Lines are never rewritten or removed. A line
//! left without its terminator by a crash is sealed (not truncated) when the
//! log is reopened, so the next append always starts on a fresh line and the
//! torn line is skipped by readers as undecodable. A failed append is sealed
//! the same way before the next line goes out.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in log operations
#[derive(Debug, Error)]
pub enum LogError {
    #[error("log write failed: {0}")]
    Io(#[from] io::Error),
    #[error("line contains a line separator")]
    InvalidLine,
    #[error("log appender is closed")]
    Closed,
}

/// Append-only log writer
///
/// Appends go through a `BufWriter` and are not flushed individually; call
/// [`AppendLog::flush`] or [`AppendLog::sync`] to push them to the OS or disk.
pub struct AppendLog<W: Write = File> {
    path: PathBuf,
    file: BufWriter<W>,
    lines_written: u64,
    bytes_written: u64,
    /// The last append may have stopped mid-line
    torn: bool,
}

impl AppendLog<File> {
    /// Open or create a log at the given path
    pub fn open(path: &Path) -> Result<Self, LogError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let torn = Self::ends_mid_line(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut log = Self {
            path: path.to_path_buf(),
            file: BufWriter::new(file),
            lines_written: 0,
            bytes_written: 0,
            torn: false,
        };

        if torn {
            tracing::warn!(path = %path.display(), "sealing unterminated last line");
            log.file.write_all(b"\n")?;
            log.file.flush()?;
        }

        Ok(log)
    }

    /// Whether the file exists and its last byte is not a line separator
    fn ends_mid_line(path: &Path) -> Result<bool, LogError> {
        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if file.metadata()?.len() == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }

    /// Flush and fsync
    pub fn sync(&mut self) -> Result<(), LogError> {
        self.file.flush()?;
        self.file.get_ref().sync_all()?;
        Ok(())
    }
}

impl<W: Write> AppendLog<W> {
    #[cfg(test)]
    fn with_writer(path: &Path, writer: W, capacity: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            file: BufWriter::with_capacity(capacity, writer),
            lines_written: 0,
            bytes_written: 0,
            torn: false,
        }
    }

    /// Append one line; the separator is added here
    ///
    /// On error part of the line may already be written. The next append
    /// starts a fresh line first, so only the failed line is lost.
    pub fn append(&mut self, line: &[u8]) -> Result<(), LogError> {
        if line.contains(&b'\n') {
            return Err(LogError::InvalidLine);
        }
        if self.torn {
            self.file.write_all(b"\n")?;
            self.torn = false;
        }
        if let Err(e) = self.write_line(line) {
            self.torn = true;
            return Err(e.into());
        }

        self.lines_written += 1;
        self.bytes_written += line.len() as u64 + 1;
        Ok(())
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.file.write_all(line)?;
        self.file.write_all(b"\n")
    }

    /// Push buffered lines to the OS
    pub fn flush(&mut self) -> Result<(), LogError> {
        self.file.flush()?;
        Ok(())
    }

    /// Lines appended since open
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Bytes appended since open
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Get the path to the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One raw line read back from the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// 1-based line number in the file
    pub number: u64,
    /// Line contents without the separator
    pub bytes: Vec<u8>,
}

/// Reader producing lazy passes over the log
pub struct LogReader {
    path: PathBuf,
}

impl LogReader {
    /// Create a reader; a missing file reads as an empty log
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Start a new pass from the beginning of the file
    ///
    /// Each call reopens the file, so a reader can be iterated repeatedly.
    pub fn lines(&self) -> Result<LogLines, LogError> {
        let reader = match File::open(&self.path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(LogLines {
            reader,
            line_number: 0,
        })
    }

    /// Get the path to the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Iterator over the non-empty lines of one pass
pub struct LogLines {
    reader: Option<BufReader<File>>,
    line_number: u64,
}

impl Iterator for LogLines {
    type Item = Result<LogLine, LogError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        loop {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None, // EOF
                Ok(_) => {
                    self.line_number += 1;
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                    }
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }

                    // Skip empty lines
                    if buf.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }

                    return Some(Ok(LogLine {
                        number: self.line_number,
                        bytes: buf,
                    }));
                }
                Err(e) => {
                    // A read error ends the pass
                    self.reader = None;
                    return Some(Err(LogError::Io(e)));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
