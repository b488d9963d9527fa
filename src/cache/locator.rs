//! Key Locator Module
//!
//! Maps a cache key to its on-disk path:
//! `<root>/<segment>/<hash[0:2]>/<hash[2:4]>/<hash>.json` where `hash` is the
//! lowercase hex MD5 of the key id.

use std::path::{Component, Path, PathBuf};

use md5::{Digest, Md5};

use crate::cache::key::{validate_segment_name, CacheKey};
use crate::cache::ENVELOPE_EXTENSION;
use crate::error::{CacheError, Result};

/// Length of a hex encoded MD5 digest.
const HASH_LEN: usize = 32;

/// Returns the hex MD5 of a key id.
pub fn hash_id(id: &str) -> String {
    format!("{:x}", Md5::digest(id.as_bytes()))
}

/// Resolves the envelope path for `key` under `root`.
pub fn locate(root: &Path, key: &CacheKey) -> Result<PathBuf> {
    validate_segment_name(&key.segment)
        .map_err(|e| CacheError::InvalidKey(format!("bad segment: {}", e)))?;
    if !is_plain_component(&key.segment) {
        return Err(CacheError::InvalidKey(format!(
            "segment \"{}\" must be a single directory name",
            key.segment
        )));
    }

    let hash = hash_id(&key.id);
    Ok(root
        .join(&key.segment)
        .join(&hash[0..2])
        .join(&hash[2..4])
        .join(format!("{}.{}", hash, ENVELOPE_EXTENSION)))
}

/// A segment must stay a single directory under the root: no separators,
/// no `.`/`..`, no absolute or drive-prefixed paths.
fn is_plain_component(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == segment
    )
}

/// Returns true if `name` looks like an envelope file (32 hex chars + `.json`).
pub fn is_envelope_file_name(name: &str) -> bool {
    match name.strip_suffix(ENVELOPE_EXTENSION) {
        Some(stem) => {
            stem.len() == HASH_LEN + 1
                && stem.ends_with('.')
                && stem[..HASH_LEN].bytes().all(|b| b.is_ascii_hexdigit())
        }
        None => false,
    }
}
