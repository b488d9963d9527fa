//! Disk Cache - A disk-resident key/value cache
//!
//! Stores each entry as a JSON envelope under a sharded directory tree, with
//! per-entry TTL expiry and a background cleaner that reclaims stale files.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheEntry, CacheKey, DiskCache};
pub use config::Config;
pub use error::{CacheError, Result};
