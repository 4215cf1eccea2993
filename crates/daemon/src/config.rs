// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: TOML file, environment, then command-line flags

use clap::Parser;
use rk_engine::ReplayConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides `server.api_key`
pub const API_KEY_ENV: &str = "RK_API_KEY";

/// Command-line arguments for `rkd`
#[derive(Debug, Default, Parser)]
#[command(name = "rkd", version, about = "Record Keeper daemon")]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Start with an empty store instead of replaying the append log
    #[arg(long)]
    pub no_replay: bool,

    /// Address to listen on (overrides `server.bind`)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub replay: ReplaySection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            api_key: "demo".to_string(),
        }
    }
}

/// The record append log
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub path: PathBuf,
    /// Lines that may wait for the writer before `add` blocks
    pub queue_depth: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("store.log"),
            queue_depth: 1024,
        }
    }
}

/// Startup replay
///
/// The store is in memory, so the log is the only record of earlier writes;
/// disabling replay starts the daemon empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplaySection {
    pub enabled: bool,
    pub workers: usize,
    pub queue_depth: usize,
}

impl Default for ReplaySection {
    fn default() -> Self {
        let defaults = ReplayConfig::default();
        Self {
            enabled: true,
            workers: defaults.workers,
            queue_depth: defaults.queue_depth,
        }
    }
}

impl ReplaySection {
    pub fn engine_config(&self) -> ReplayConfig {
        ReplayConfig {
            workers: self.workers,
            queue_depth: self.queue_depth,
        }
    }
}

/// Daemon diagnostics; stdout when no path is set
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub path: Option<PathBuf>,
}

impl Config {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the effective config from arguments and an optional env key
    pub fn resolve(args: &Args, env_api_key: Option<String>) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(key) = env_api_key {
            config.server.api_key = key;
        }
        if args.no_replay {
            config.replay.enabled = false;
        }
        if let Some(bind) = args.bind {
            config.server.bind = bind;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.api_key.is_empty() {
            return Err(ConfigError::Invalid("server.api_key must not be empty".into()));
        }
        if self.log.queue_depth == 0 {
            return Err(ConfigError::Invalid("log.queue_depth must be at least 1".into()));
        }
        if self.replay.workers == 0 {
            return Err(ConfigError::Invalid("replay.workers must be at least 1".into()));
        }
        if self.replay.queue_depth == 0 {
            return Err(ConfigError::Invalid("replay.queue_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// Advisory lock guarding the append log against a second writer
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.log.path.clone().into_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
