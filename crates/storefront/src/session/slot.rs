//! Durable single-slot token storage.
//!
//! The session store persists at most one access token at a time; writing a
//! new one overwrites the old one atomically. The file-backed slot is the
//! production implementation, the in-memory slot backs tests.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// One durable storage slot for the session token.
pub trait SessionSlot: Send + Sync + fmt::Debug {
    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn load(&self) -> io::Result<Option<String>>;

    /// Overwrite the slot with a new token.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn store(&self, token: &str) -> io::Result<()>;

    /// Empty the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be cleared.
    fn clear(&self) -> io::Result<()>;
}

/// File-backed slot; survives process restarts.
#[derive(Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Create a slot backed by the given file path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionSlot for FileSlot {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(token) => {
                let token = token.trim().to_owned();
                Ok((!token.is_empty()).then_some(token))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn store(&self, token: &str) -> io::Result<()> {
        // Write-then-rename keeps the overwrite atomic on the same filesystem
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, token)?;
        fs::rename(&tmp, &self.path)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-memory slot for tests; forgets everything on drop.
#[derive(Debug, Default)]
pub struct MemorySlot {
    token: Mutex<Option<String>>,
}

impl SessionSlot for MemorySlot {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.token.lock().map_err(poisoned)?.clone())
    }

    fn store(&self, token: &str) -> io::Result<()> {
        *self.token.lock().map_err(poisoned)? = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.lock().map_err(poisoned)? = None;
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> io::Error {
    io::Error::other("session slot lock poisoned")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_slot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("session"));

        assert_eq!(slot.load().unwrap(), None);
        slot.store("token-a").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("token-a"));

        // A new session overwrites the old one
        slot.store("token-b").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("token-b"));

        slot.clear().unwrap();
        assert_eq!(slot.load().unwrap(), None);
        // Clearing an empty slot is fine
        slot.clear().unwrap();
    }

    #[test]
    fn test_memory_slot_roundtrip() {
        let slot = MemorySlot::default();
        assert_eq!(slot.load().unwrap(), None);
        slot.store("token").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("token"));
        slot.clear().unwrap();
        assert_eq!(slot.load().unwrap(), None);
    }
}
