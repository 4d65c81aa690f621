//! # sunswitch-adapter-ledger-json
//!
//! [`LedgerStore`] implementation backed by a single JSON file:
//!
//! ```json
//! {
//!   "porch:auto-changed": "1",
//!   "porch:auto-timestamp": "2015-09-30T05:30:00+00:00"
//! }
//! ```
//!
//! Saves write a temporary file next to the ledger and rename it over the
//! target, so a crash never leaves a half-written ledger behind. There is no
//! locking: only one run may use a ledger file at a time.

mod error;

use std::io::Write;
use std::path::{Path, PathBuf};

use sunswitch_app::ports::LedgerStore;
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::ledger::OverrideLedger;

pub use error::LedgerFileError;

/// Ledger stored as a flat JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<OverrideLedger, LedgerFileError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger file yet, starting empty");
                return Ok(OverrideLedger::new());
            }
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(OverrideLedger::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, ledger: &OverrideLedger) -> Result<(), LedgerFileError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, ledger)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path)?;
        Ok(())
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self) -> Result<OverrideLedger, SunswitchError> {
        let ledger = self.read()?;
        tracing::debug!(path = %self.path.display(), entries = ledger.len(), "ledger read");
        Ok(ledger)
    }

    fn save(&self, ledger: &OverrideLedger) -> Result<(), SunswitchError> {
        self.write(ledger)?;
        tracing::debug!(path = %self.path.display(), entries = ledger.len(), "ledger written");
        Ok(())
    }
}
