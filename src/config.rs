//! Configuration Module
//!
//! Handles loading and managing engine configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::{CacheError, Result};

/// Default interval between cleaner sweeps (one hour).
pub const DEFAULT_CLEAN_EVERY_MS: u64 = 60 * 60 * 1000;

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory holding all cache segments
    pub cache_path: PathBuf,
    /// Milliseconds between cleaner sweeps, 0 disables the cleaner
    pub clean_every: u64,
}

impl Config {
    /// Creates a Config for the given cache root with the default sweep interval.
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            clean_every: DEFAULT_CLEAN_EVERY_MS,
        }
    }

    /// Sets the sweep interval in milliseconds.
    pub fn with_clean_every(mut self, clean_every: u64) -> Self {
        self.clean_every = clean_every;
        self
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PATH` - Cache root directory (required)
    /// - `CLEAN_EVERY` - Sweep interval in milliseconds (default: 3600000, 0 disables)
    pub fn from_env() -> Result<Self> {
        let cache_path = env::var("CACHE_PATH")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CacheError::InvalidConfig("Missing CACHE_PATH value".to_string()))?;

        let clean_every = match env::var("CLEAN_EVERY") {
            Ok(raw) => parse_clean_every(&raw)?,
            Err(_) => DEFAULT_CLEAN_EVERY_MS,
        };

        Ok(Self::new(cache_path).with_clean_every(clean_every))
    }

    /// Checks the values a running engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.cache_path.as_os_str().is_empty() {
            return Err(CacheError::InvalidConfig(
                "Missing cache_path value".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_clean_every(raw: &str) -> Result<u64> {
    raw.trim().parse().map_err(|_| {
        CacheError::InvalidConfig(format!(
            "CLEAN_EVERY must be a non-negative integer, got \"{}\"",
            raw
        ))
    })
}
