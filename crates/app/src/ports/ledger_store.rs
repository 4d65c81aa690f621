//! Ledger store port: persistence of the override ledger between runs.

use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::ledger::OverrideLedger;

/// Loads and saves the whole [`OverrideLedger`] at once.
pub trait LedgerStore {
    /// Read the ledger. A store that was never written yields an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Ledger`] when existing data cannot be read or parsed.
    fn load(&self) -> Result<OverrideLedger, SunswitchError>;

    /// Replace the persisted ledger with `ledger`.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Ledger`] when the ledger cannot be written.
    fn save(&self, ledger: &OverrideLedger) -> Result<(), SunswitchError>;
}

impl<T: LedgerStore + ?Sized> LedgerStore for &T {
    fn load(&self) -> Result<OverrideLedger, SunswitchError> {
        (**self).load()
    }

    fn save(&self, ledger: &OverrideLedger) -> Result<(), SunswitchError> {
        (**self).save(ledger)
    }
}
