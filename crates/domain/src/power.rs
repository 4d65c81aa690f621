//! Power state: the binary on/off condition of a switch or light.

use serde::{Deserialize, Serialize};

/// Discrete power state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// Whether the device is powered.
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Wire representation used by device drivers and the ledger (`1` / `0`).
    #[must_use]
    pub fn as_bit(self) -> u8 {
        match self {
            Self::On => 1,
            Self::Off => 0,
        }
    }

    /// Parse the wire representation. Anything other than `0`/`1` is rejected.
    #[must_use]
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            1 => Some(Self::On),
            0 => Some(Self::Off),
            _ => None,
        }
    }

    /// Parse the ledger's textual form (`"1"` / `"0"`).
    #[must_use]
    pub fn from_bit_str(value: &str) -> Option<Self> {
        value.trim().parse::<u8>().ok().and_then(Self::from_bit)
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
        }
    }
}
