//! The persistence contract and its built-in sinks.
//!
//! The driving loop hands serialized engine snapshots to a
//! [`PersistenceSink`] on a blocking task, so implementations may do slow
//! synchronous I/O. A failing sink never touches in-memory state: the
//! loop logs the failure and tries again at the next interval.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::debug;

use progenitor_types::{RunId, Tick};

/// Errors from saving or loading snapshots.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading or writing the backing store failed.
    #[error("persistence I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded or decoded.
    #[error("snapshot JSON error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// The snapshot was written by an incompatible format version.
    #[error("incompatible snapshot format {found} (expected {expected})")]
    IncompatibleVersion {
        /// Version found in the snapshot.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// The snapshot decoded but its contents are inconsistent.
    #[error("corrupt snapshot: {reason}")]
    Corrupt {
        /// What is inconsistent.
        reason: String,
    },
}

/// Durable storage for engine snapshots.
pub trait PersistenceSink: Send + Sync {
    /// Prepare storage for a new run, discarding anything from a
    /// previous one.
    fn reset(&self, run_id: RunId) -> Result<(), PersistError>;

    /// Store a serialized snapshot taken after `tick`.
    fn flush(&self, tick: Tick, snapshot: &[u8]) -> Result<(), PersistError>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PersistenceSink for NullSink {
    fn reset(&self, _run_id: RunId) -> Result<(), PersistError> {
        Ok(())
    }

    fn flush(&self, _tick: Tick, _snapshot: &[u8]) -> Result<(), PersistError> {
        Ok(())
    }
}

/// Writes each snapshot to a single JSON file.
///
/// The snapshot is written to a sibling temporary file first and renamed
/// over the target, so a crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// A sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceSink for JsonFileSink {
    fn reset(&self, run_id: RunId) -> Result<(), PersistError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        debug!(run = %run_id, path = %self.path.display(), "save file reset");
        Ok(())
    }

    fn flush(&self, tick: Tick, snapshot: &[u8]) -> Result<(), PersistError> {
        let temp = self.temp_path();
        {
            let mut file = std::fs::File::create(&temp)?;
            file.write_all(snapshot)?;
            file.sync_all()?;
        }
        std::fs::rename(&temp, &self.path)?;
        debug!(tick, bytes = snapshot.len(), path = %self.path.display(), "snapshot written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("progenitor-sink-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("save.json")
    }

    #[test]
    fn file_sink_replaces_previous_snapshot() {
        let path = scratch("replace");
        let sink = JsonFileSink::new(&path);
        sink.flush(1, b"{\"first\":true}").unwrap();
        sink.flush(2, b"{\"second\":true}").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"{\"second\":true}");
        assert!(!sink.temp_path().exists());
    }

    #[test]
    fn reset_removes_save_and_tolerates_absence() {
        let path = scratch("reset");
        let sink = JsonFileSink::new(&path);
        sink.flush(1, b"{}").unwrap();
        sink.reset(RunId::new()).unwrap();
        assert!(!path.exists());
        sink.reset(RunId::new()).unwrap();
    }

    #[test]
    fn temp_file_is_a_sibling() {
        let sink = JsonFileSink::new("/var/saves/world.json");
        assert_eq!(sink.temp_path(), PathBuf::from("/var/saves/world.json.tmp"));
    }

    #[test]
    fn null_sink_accepts_everything() {
        assert!(NullSink.reset(RunId::new()).is_ok());
        assert!(NullSink.flush(0, b"ignored").is_ok());
    }
}
