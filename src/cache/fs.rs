//! Filesystem primitives used by the engine.
//!
//! Every failure is reported as a `CacheError::Io` naming the operation and
//! path, with the original `io::Error` kept as the source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;
use tokio::fs;

use crate::error::{CacheError, Result};

const DISK_ACCESS_BODY: &str = "test-body-value";

/// Self-test file ids are 11 digits so engines sharing a root do not collide.
const SELF_TEST_ID_RANGE: std::ops::Range<u64> = 10_000_000_000..100_000_000_000;

/// Reads a whole file, returning `None` if it does not exist.
pub async fn read_file_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CacheError::io(
            format!("Error reading from \"{}\"", path.display()),
            e,
        )),
    }
}

/// Replaces `path` with `contents`.
///
/// The bytes go to a hidden sibling first and are renamed over `path`, so a
/// concurrent reader sees either the previous file or the complete new one.
pub async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path);

    if let Err(e) = fs::write(&tmp, contents).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(CacheError::io(
            format!("Error writing to \"{}\"", path.display()),
            e,
        ));
    }

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(CacheError::io(
            format!("Error writing to \"{}\"", path.display()),
            e,
        ));
    }
    Ok(())
}

/// `.<name>.<nonce>.tmp` next to `path`; never matches the envelope pattern.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let nonce: u64 = rand::rng().random();
    path.with_file_name(format!(".{}.{:016x}.tmp", name, nonce))
}

/// Deletes a file; a missing file is an error.
pub async fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path)
        .await
        .map_err(|e| CacheError::io(format!("Error unlinking \"{}\"", path.display()), e))
}

/// Deletes a file, returning `false` if it was already gone.
pub async fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Creates a directory and all missing parents.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await.map_err(|e| {
        CacheError::io(
            format!("Error creating directory \"{}\"", path.display()),
            e,
        )
    })
}

/// Fails with `InvalidCachePath` unless `path` exists and is a directory.
pub async fn ensure_directory(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).await.map_err(|e| {
        CacheError::InvalidCachePath(
            path.to_path_buf(),
            format!("Error getting statistics: {}", e),
        )
    })?;

    if !metadata.is_dir() {
        return Err(CacheError::InvalidCachePath(
            path.to_path_buf(),
            "not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Writes, reads back and deletes a scratch file to confirm disk access.
pub async fn test_disk_access(dir: &Path) -> Result<()> {
    let rando: u64 = rand::rng().random_range(SELF_TEST_ID_RANGE);
    let path = dir.join(format!("testDiskAccess.{}.txt", rando));

    write_file(&path, DISK_ACCESS_BODY.as_bytes()).await?;
    let data = fs::read(&path)
        .await
        .map_err(|e| CacheError::io(format!("Error reading from \"{}\"", path.display()), e));
    remove_file(&path).await?;

    let data = data?;
    if data != DISK_ACCESS_BODY.as_bytes() {
        return Err(CacheError::io(
            format!("Error verifying \"{}\"", path.display()),
            std::io::Error::new(
                ErrorKind::InvalidData,
                format!(
                    "value \"{}\" does not equal \"{}\"",
                    String::from_utf8_lossy(&data),
                    DISK_ACCESS_BODY
                ),
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_file_if_exists(&dir.path().join("nope.json")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");

        write_file(&path, b"first").await.unwrap();
        write_file(&path, b"second").await.unwrap();

        let bytes = read_file_if_exists(&path).await.unwrap().unwrap();
        assert_eq!(bytes, b"second");
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");

        write_file(&path, b"one").await.unwrap();
        write_file(&path, b"two").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("a.json")]);
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("a.json");

        let err = write_file(&path, b"x").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_never_see_partial_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");
        let small = vec![b'a'; 16];
        let large = vec![b'b'; 256 * 1024];
        write_file(&path, &small).await.unwrap();

        let writer = {
            let (path, small, large) = (path.clone(), small.clone(), large.clone());
            tokio::spawn(async move {
                for n in 0..200 {
                    let body = if n % 2 == 0 { &large } else { &small };
                    write_file(&path, body).await.unwrap();
                }
            })
        };

        for _ in 0..400 {
            let bytes = read_file_if_exists(&path).await.unwrap();
            let bytes = bytes.expect("file must never be missing between writes");
            assert!(bytes == small || bytes == large, "read {} bytes", bytes.len());
        }
        writer.await.unwrap();
    }

    #[test]
    fn test_temp_sibling_is_not_an_envelope() {
        let path = Path::new("/cache/test/9d/d4/9dd4e461268c8034f5c8564e155c67a6.json");
        let tmp = temp_sibling(path);

        assert_eq!(tmp.parent(), path.parent());
        let name = tmp.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".9dd4e461268c8034f5c8564e155c67a6.json."));
        assert!(name.ends_with(".tmp"));
        assert!(!crate::cache::is_envelope_file_name(name));
    }

    #[tokio::test]
    async fn test_remove_file_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");
        write_file(&path, b"x").await.unwrap();

        assert!(remove_file_if_exists(&path).await.unwrap());
        assert!(!remove_file_if_exists(&path).await.unwrap());

        let err = remove_file(&path).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("Error unlinking"));
    }

    #[tokio::test]
    async fn test_create_dir_all_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("seg").join("ab").join("cd");

        create_dir_all(&nested).await.unwrap();
        create_dir_all(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_directory() {
        let dir = TempDir::new().unwrap();
        ensure_directory(dir.path()).await.unwrap();

        let file = dir.path().join("diskCacheTestFile.txt");
        std::fs::write(&file, "ok").unwrap();
        assert!(matches!(
            ensure_directory(&file).await,
            Err(CacheError::InvalidCachePath(_, _))
        ));
        assert!(matches!(
            ensure_directory(&dir.path().join("does/not/exist")).await,
            Err(CacheError::InvalidCachePath(_, _))
        ));
    }

    #[test]
    fn test_self_test_ids_have_eleven_digits() {
        assert_eq!(SELF_TEST_ID_RANGE.start.to_string().len(), 11);
        assert_eq!((SELF_TEST_ID_RANGE.end - 1).to_string().len(), 11);
        for _ in 0..100 {
            let id: u64 = rand::rng().random_range(SELF_TEST_ID_RANGE);
            assert_eq!(id.to_string().len(), 11);
        }
    }

    #[tokio::test]
    async fn test_disk_access_leaves_no_files() {
        let dir = TempDir::new().unwrap();
        test_disk_access(dir.path()).await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
