//! Cache Key Module
//!
//! Defines the `(segment, id)` key and segment name validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CacheError, Result};

// == Cache Key ==
/// Identifies an entry: `segment` is the namespace, `id` the item within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Item identifier within the segment
    pub id: String,
    /// Namespace, used as the top-level directory
    pub segment: String,
}

impl CacheKey {
    /// Creates a key from a segment and id.
    pub fn new(segment: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            segment: segment.into(),
        }
    }
}

impl TryFrom<&Value> for CacheKey {
    type Error = CacheError;

    /// Converts an untyped key such as `{"id": "x", "segment": "test"}`.
    fn try_from(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CacheError::InvalidKey(format!("expected an object, got {}", value)))?;

        let field = |name: &str| -> Result<String> {
            match obj.get(name) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(other) => Err(CacheError::InvalidKey(format!(
                    "{} must be a string, got {}",
                    name, other
                ))),
                None => Err(CacheError::InvalidKey(format!("missing {}", name))),
            }
        };

        Ok(Self {
            id: field("id")?,
            segment: field("segment")?,
        })
    }
}

// == Segment Validation ==
/// Rejects segment names that cannot be used as a directory component.
pub fn validate_segment_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CacheError::InvalidSegmentName("Empty string".to_string()));
    }

    if name.contains('\0') {
        return Err(CacheError::InvalidSegmentName(
            "Includes null character".to_string(),
        ));
    }

    Ok(())
}
