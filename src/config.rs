// src/config.rs

//! Manages server configuration: loading, defaulting, and validation.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    2024
}
fn default_mirror_a_port() -> u16 {
    2025
}
fn default_mirror_b_port() -> u16 {
    2026
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_workdir_name() -> String {
    "w24project".to_string()
}
fn default_max_walk_depth() -> usize {
    20
}

/// The raw, deserialized form of the configuration file. Every field is
/// optional on disk; defaults are applied here and validated in `Config`.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct RawConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_mirror_a_port")]
    mirror_a_port: u16,
    #[serde(default = "default_mirror_b_port")]
    mirror_b_port: u16,
    #[serde(default = "default_log_level")]
    log_level: String,
    /// Root of the tree served to clients. Defaults to `$HOME`.
    #[serde(default)]
    served_root: Option<PathBuf>,
    #[serde(default = "default_workdir_name")]
    workdir_name: String,
    #[serde(default = "default_max_walk_depth")]
    max_walk_depth: usize,
}

/// The validated server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mirror_a_port: u16,
    pub mirror_b_port: u16,
    pub log_level: String,
    pub served_root: PathBuf,
    pub workdir_name: String,
    pub max_walk_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mirror_a_port: default_mirror_a_port(),
            mirror_b_port: default_mirror_b_port(),
            log_level: default_log_level(),
            served_root: default_served_root(),
            workdir_name: default_workdir_name(),
            max_walk_depth: default_max_walk_depth(),
        }
    }
}

/// Resolves the default served root: the user's home directory, falling back
/// to the current directory when `$HOME` is unset.
fn default_served_root() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Loads and validates the configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let raw: RawConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;

        let config = Config {
            host: raw.host,
            port: raw.port,
            mirror_a_port: raw.mirror_a_port,
            mirror_b_port: raw.mirror_b_port,
            log_level: raw.log_level,
            served_root: raw.served_root.unwrap_or_else(default_served_root),
            workdir_name: raw.workdir_name,
            max_walk_depth: raw.max_walk_depth,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        for (name, port) in [
            ("port", self.port),
            ("mirror_a_port", self.mirror_a_port),
            ("mirror_b_port", self.mirror_b_port),
        ] {
            if port == 0 {
                return Err(anyhow!("'{name}' must be nonzero"));
            }
        }
        if self.port == self.mirror_a_port
            || self.port == self.mirror_b_port
            || self.mirror_a_port == self.mirror_b_port
        {
            return Err(anyhow!(
                "port, mirror_a_port, and mirror_b_port must be pairwise distinct"
            ));
        }
        if self.max_walk_depth == 0 {
            return Err(anyhow!("'max_walk_depth' must be at least 1"));
        }
        if self.workdir_name.is_empty() || self.workdir_name.contains('/') {
            return Err(anyhow!("'workdir_name' must be a single path component"));
        }
        Ok(())
    }

    /// The redirect targets for the round-robin admission tier, in order:
    /// primary, mirror A, mirror B.
    pub fn rotation_ports(&self) -> [u16; 3] {
        [self.port, self.mirror_a_port, self.mirror_b_port]
    }
}
