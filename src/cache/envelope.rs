//! Envelope Codec Module
//!
//! The on-disk record wrapping a value with its TTL metadata, and the expiry
//! arithmetic shared by reads and the cleaner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::key::CacheKey;
use crate::error::{CacheError, Result};

// == Envelope ==
/// A decoded envelope as read back from disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    /// Key the envelope was written for
    pub key: CacheKey,
    /// Opaque caller value
    pub item: Value,
    /// Write time (Unix milliseconds)
    pub stored: i64,
    /// Original TTL in milliseconds
    pub ttl: i64,
    /// Informational expiry timestamp, never used for the expiry decision
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

/// Borrowed form used for encoding so `set` never clones the value.
#[derive(Serialize)]
struct EnvelopeRef<'a, T: ?Sized> {
    key: &'a CacheKey,
    item: &'a T,
    stored: i64,
    ttl: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires: Option<DateTime<Utc>>,
}

impl Envelope {
    /// Milliseconds left before expiry at `now`; zero or less means expired.
    pub fn remaining_ttl(&self, now: i64) -> i64 {
        self.stored.saturating_add(self.ttl).saturating_sub(now)
    }

    /// An envelope is expired iff `stored + ttl <= now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.remaining_ttl(now) <= 0
    }
}

// == Codec ==
/// Encodes a value into envelope bytes stamped with `stored`.
///
/// Fails with `Serialization` before anything touches the disk.
pub fn encode<T>(key: &CacheKey, item: &T, ttl: i64, stored: i64) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let envelope = EnvelopeRef {
        key,
        item,
        stored,
        ttl,
        expires: DateTime::from_timestamp_millis(stored.saturating_add(ttl)),
    };
    serde_json::to_vec(&envelope).map_err(CacheError::Serialization)
}

/// Decodes envelope bytes, failing with `CorruptEnvelope` on malformed input.
pub fn decode(bytes: &[u8]) -> Result<Envelope> {
    serde_json::from_slice(bytes).map_err(CacheError::CorruptEnvelope)
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}
