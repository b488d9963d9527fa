//! Cache Module
//!
//! Disk-resident key/value storage with per-entry TTL expiry.
//!
//! Each entry lives in its own JSON envelope file at
//! `<cache_path>/<segment>/<hh>/<hh>/<md5(id)>.json`.

pub mod envelope;
mod entry;
mod fs;
mod key;
mod locator;
mod stats;
pub(crate) mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use envelope::Envelope;
pub use key::{validate_segment_name, CacheKey};
pub use locator::{hash_id, is_envelope_file_name, locate};
pub use stats::SweepStats;
pub use store::DiskCache;

// == Public Constants ==
/// Maximum accepted TTL in milliseconds (2^31 - 1)
pub const MAX_TTL_MS: i64 = 2_147_483_647;

/// File extension of envelope files
pub const ENVELOPE_EXTENSION: &str = "json";
