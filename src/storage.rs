use crate::database::Database;
use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// How the backing file was brought into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file existed and parsed.
    Loaded,
    /// No file yet; a fresh empty database was created.
    Created,
    /// The file existed but could not be read or parsed; an empty database
    /// was substituted. The previous contents are gone once the next save
    /// runs.
    Recovered,
}

/// Abstraction over how the `Database` is persisted.
///
/// Today we just have a JSON-file-backed engine, but the store only needs
/// load-whole and save-whole, so alternative layouts can slot in behind
/// this trait.
pub trait StorageEngine: Send + Sync {
    /// Load the database, reporting whether the file was usable.
    fn load(&self) -> (Database, LoadOutcome);

    /// Persist the given database in full.
    fn save(&self, db: &Database) -> Result<()>;
}

/// JSON file based storage engine.
///
/// The on-disk shape is one pretty-printed object with exactly the five
/// table keys, each an array of row objects. Saves replace the whole file
/// atomically: the new contents are written to a temporary file in the
/// same directory and renamed over the target, so a crash mid-write never
/// leaves a truncated file behind.
pub struct JsonStorageEngine {
    path: PathBuf,
}

impl JsonStorageEngine {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonStorageEngine { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl StorageEngine for JsonStorageEngine {
    fn load(&self) -> (Database, LoadOutcome) {
        if !self.path.exists() {
            return (Database::new(), LoadOutcome::Created);
        }
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "unreadable database file, starting empty");
                return (Database::new(), LoadOutcome::Recovered);
            }
        };
        match serde_json::from_str(&data) {
            Ok(db) => (db, LoadOutcome::Loaded),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "unparseable database file, starting empty");
                (Database::new(), LoadOutcome::Recovered)
            }
        }
    }

    fn save(&self, db: &Database) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let data = serde_json::to_string_pretty(db)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data.as_bytes())?;
        tmp.persist(&self.path).map_err(|err| Error::Io(err.error))?;
        tracing::debug!(path = %self.path.display(), bytes = data.len(), "database saved");
        Ok(())
    }
}
