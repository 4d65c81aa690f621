//! Ledger-file specific error type.

use sunswitch_domain::error::SunswitchError;

/// Errors originating from the JSON ledger file.
#[derive(Debug, thiserror::Error)]
pub enum LedgerFileError {
    /// The file could not be read, written or renamed.
    #[error("ledger file I/O error")]
    Io(#[from] std::io::Error),

    /// The file is not a flat JSON object of strings.
    #[error("ledger file is not valid JSON")]
    Json(#[from] serde_json::Error),

    /// The temporary file could not replace the ledger.
    #[error("unable to replace ledger file")]
    Persist(#[from] tempfile::PersistError),
}

impl From<LedgerFileError> for SunswitchError {
    fn from(err: LedgerFileError) -> Self {
        Self::Ledger(Box::new(err))
    }
}
