//! File Backend Module
//!
//! Stores each key as one file inside a directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::persistence::PersistenceBackend;

// == File Backend ==
/// Directory-backed store: `<dir>/<encoded key>.json`.
///
/// Writes go to a sibling temp file and are renamed into place, so a crash
/// mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

impl PersistenceBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn erase(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// == Key Encoding ==
/// Maps a key to a safe file stem: ASCII alphanumerics, `-` and `_` pass
/// through, every other byte becomes `%XX`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("user_data-center"), "user_data-center");
        assert_eq!(encode_key("a/b"), "a%2Fb");
        assert_eq!(encode_key("../x"), "%2E%2E%2Fx");
        assert_eq!(encode_key(""), "");
    }

    #[test]
    fn test_file_backend_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path().join("store"));

        assert_eq!(backend.read("cache").unwrap(), None);

        backend.write("cache", "[]").unwrap();
        assert_eq!(backend.read("cache").unwrap(), Some("[]".to_string()));
        assert!(backend.path_for("cache").exists());

        backend.write("cache", "[1]").unwrap();
        assert_eq!(backend.read("cache").unwrap(), Some("[1]".to_string()));

        backend.erase("cache").unwrap();
        assert_eq!(backend.read("cache").unwrap(), None);
    }

    #[test]
    fn test_file_backend_erase_absent() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());
        assert!(backend.erase("nothing").is_ok());
    }

    #[test]
    fn test_file_backend_keys_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());

        backend.write("a", "1").unwrap();
        backend.write("b", "2").unwrap();
        backend.erase("a").unwrap();

        assert_eq!(backend.read("a").unwrap(), None);
        assert_eq!(backend.read("b").unwrap(), Some("2".to_string()));
    }
}
