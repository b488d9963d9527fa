//! Cache Entry Module
//!
//! The record handed back to callers by a successful `get`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cache::envelope::Envelope;
use crate::cache::key::CacheKey;
use crate::error::{CacheError, Result};

// == Cache Entry ==
/// A live entry read from disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    /// Key the entry was stored under
    pub key: CacheKey,
    /// The stored value
    pub item: Value,
    /// Write time (Unix milliseconds)
    pub stored: i64,
    /// Remaining lifetime in milliseconds at read time
    pub ttl: i64,
}

impl CacheEntry {
    /// Builds an entry from a decoded envelope and its remaining lifetime.
    pub fn from_envelope(envelope: Envelope, remaining: i64) -> Self {
        Self {
            key: envelope.key,
            item: envelope.item,
            stored: envelope.stored,
            ttl: remaining,
        }
    }

    /// Write time as a UTC timestamp.
    pub fn stored_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.stored)
    }

    /// Deserializes the stored item into a concrete type.
    pub fn item_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.item.clone()).map_err(CacheError::Serialization)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn sample_envelope(item: Value) -> Envelope {
        Envelope {
            key: CacheKey::new("test", "x"),
            item,
            stored: 1_700_000_000_000,
            ttl: 5000,
            expires: None,
        }
    }

    #[test]
    fn test_entry_reports_remaining_ttl() {
        let entry = CacheEntry::from_envelope(sample_envelope(json!("123")), 4200);

        assert_eq!(entry.item, json!("123"));
        assert_eq!(entry.ttl, 4200);
        assert_eq!(entry.stored, 1_700_000_000_000);
        assert_eq!(
            entry.stored_at().unwrap().timestamp_millis(),
            1_700_000_000_000
        );
    }

    #[test]
    fn test_item_as() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Profile {
            name: String,
            visits: u32,
        }

        let entry = CacheEntry::from_envelope(
            sample_envelope(json!({ "name": "ada", "visits": 3 })),
            100,
        );
        let profile: Profile = entry.item_as().unwrap();
        assert_eq!(
            profile,
            Profile {
                name: "ada".to_string(),
                visits: 3
            }
        );

        assert!(matches!(
            entry.item_as::<Vec<u8>>(),
            Err(CacheError::Serialization(_))
        ));
    }
}
