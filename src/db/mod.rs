use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HAS_VOTED_KEY: &str = "peru2026_voted";
pub const VOTE_TALLY_KEY: &str = "peru2026_mock_votes";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger storage unavailable: {0}")]
    Unavailable(#[from] io::Error),
    #[error("ledger contents could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Key-value storage scoped to a single client profile.
pub trait VoteLedger {
    fn read(&self, key: &str) -> Result<Option<String>, LedgerError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), LedgerError>;
    /// Stores every entry or none of them.
    fn write_all(&mut self, entries: &[(&str, &str)]) -> Result<(), LedgerError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    entries: HashMap<String, String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl VoteLedger for MemoryLedger {
    fn read(&self, key: &str) -> Result<Option<String>, LedgerError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn write_all(&mut self, entries: &[(&str, &str)]) -> Result<(), LedgerError> {
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// A ledger backed by one JSON object file per client profile.
///
/// The whole file is rewritten on every write through a sibling temp file
/// and a rename, so readers never see a half-written file. Two processes
/// sharing a file are last-writer-wins.
///
/// A file that exists but cannot be read is never overwritten.
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    writable: bool,
}

impl JsonFileLedger {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut writable = true;
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ledger file {} is corrupt, starting empty: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No ledger file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!(
                    "Failed to read ledger file {}, this session will not save: {}",
                    path.display(),
                    e
                );
                writable = false;
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries,
            writable,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // profile.json -> profile.json.tmp
    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn flush(&self) -> Result<(), LedgerError> {
        let encoded = serde_json::to_string_pretty(&self.entries)?;
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, encoded)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl VoteLedger for JsonFileLedger {
    fn read(&self, key: &str) -> Result<Option<String>, LedgerError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        self.write_all(&[(key, value)])
    }

    fn write_all(&mut self, entries: &[(&str, &str)]) -> Result<(), LedgerError> {
        if !self.writable {
            return Err(LedgerError::Unavailable(io::Error::other(format!(
                "{} could not be read at startup",
                self.path.display()
            ))));
        }

        let previous = self.entries.clone();
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.to_string());
        }
        if let Err(e) = self.flush() {
            // Keep memory in step with disk
            self.entries = previous;
            return Err(e);
        }
        Ok(())
    }
}

/// Either ledger, picked at startup from configuration.
#[derive(Debug)]
pub enum ProfileLedger {
    Memory(MemoryLedger),
    File(JsonFileLedger),
}

impl VoteLedger for ProfileLedger {
    fn read(&self, key: &str) -> Result<Option<String>, LedgerError> {
        match self {
            Self::Memory(ledger) => ledger.read(key),
            Self::File(ledger) => ledger.read(key),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        match self {
            Self::Memory(ledger) => ledger.write(key, value),
            Self::File(ledger) => ledger.write(key, value),
        }
    }

    fn write_all(&mut self, entries: &[(&str, &str)]) -> Result<(), LedgerError> {
        match self {
            Self::Memory(ledger) => ledger.write_all(entries),
            Self::File(ledger) => ledger.write_all(entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_ledger_missing_key_is_none() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.read(HAS_VOTED_KEY).unwrap(), None);
    }

    #[test]
    fn memory_ledger_overwrites() {
        let mut ledger = MemoryLedger::new().with_entry(VOTE_TALLY_KEY, "{}");
        ledger.write(VOTE_TALLY_KEY, r#"{"1":5}"#).unwrap();
        assert_eq!(ledger.read(VOTE_TALLY_KEY).unwrap().as_deref(), Some(r#"{"1":5}"#));
    }

    #[test]
    fn file_ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let mut ledger = JsonFileLedger::open(&path);
        ledger.write(VOTE_TALLY_KEY, r#"{"1":100}"#).unwrap();
        ledger
            .write_all(&[(VOTE_TALLY_KEY, r#"{"1":101}"#), (HAS_VOTED_KEY, "true")])
            .unwrap();
        drop(ledger);

        let reopened = JsonFileLedger::open(&path);
        assert_eq!(reopened.read(HAS_VOTED_KEY).unwrap().as_deref(), Some("true"));
        assert_eq!(reopened.read(VOTE_TALLY_KEY).unwrap().as_deref(), Some(r#"{"1":101}"#));
        assert!(!dir.path().join("profile.json.tmp").exists());
    }

    #[test]
    fn file_ledger_leaves_similarly_named_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        let neighbour = dir.path().join("profile.tmp");
        fs::write(&neighbour, "keep me").unwrap();

        let mut ledger = JsonFileLedger::open(&path);
        ledger.write(HAS_VOTED_KEY, "true").unwrap();

        assert_eq!(fs::read_to_string(&neighbour).unwrap(), "keep me");
    }

    #[test]
    fn file_ledger_treats_corrupt_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "not json at all").unwrap();

        let ledger = JsonFileLedger::open(&path);
        assert_eq!(ledger.read(HAS_VOTED_KEY).unwrap(), None);
    }

    #[test]
    fn file_ledger_never_overwrites_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists at the path but cannot be read as a file
        let path = dir.path().join("profile.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("marker"), "stored vote").unwrap();

        let mut ledger = JsonFileLedger::open(&path);
        let result = ledger.write(HAS_VOTED_KEY, "true");

        assert!(matches!(result, Err(LedgerError::Unavailable(_))));
        assert!(!dir.path().join("profile.json.tmp").exists());
        assert_eq!(fs::read_to_string(path.join("marker")).unwrap(), "stored vote");
    }

    #[test]
    fn file_ledger_batch_failure_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("profile.json");

        let mut ledger = JsonFileLedger::open(&path);
        let result = ledger.write_all(&[(VOTE_TALLY_KEY, r#"{"1":1}"#), (HAS_VOTED_KEY, "true")]);
        assert!(matches!(result, Err(LedgerError::Unavailable(_))));
        assert_eq!(ledger.read(HAS_VOTED_KEY).unwrap(), None);
        assert_eq!(ledger.read(VOTE_TALLY_KEY).unwrap(), None);
    }
}
