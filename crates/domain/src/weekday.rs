//! Weekday sets used to restrict rules to certain days.
//!
//! Days are numbered Monday = 0 … Sunday = 6. Configuration files write them
//! as digit strings (`"0"`…`"6"`); plain integers are accepted as well.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// A set of weekdays stored as a 7-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Monday through Friday.
    pub const WORKDAYS: Self = Self(0b001_1111);

    /// Build a set from weekday indices.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWeekday`] for indices above 6.
    pub fn from_indices(indices: impl IntoIterator<Item = u8>) -> Result<Self, ConfigError> {
        let mut set = Self::EMPTY;
        for index in indices {
            if index > 6 {
                return Err(ConfigError::InvalidWeekday(index.to_string()));
            }
            set.0 |= 1 << index;
        }
        Ok(set)
    }

    /// Parse a single digit-string weekday.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWeekday`] when `value` is not `0`…`6`.
    pub fn parse_index(value: &str) -> Result<u8, ConfigError> {
        match value.trim().parse::<u8>() {
            Ok(index) if index <= 6 => Ok(index),
            _ => Err(ConfigError::InvalidWeekday(value.to_string())),
        }
    }

    #[must_use]
    pub fn contains_index(self, index: u8) -> bool {
        index <= 6 && self.0 & (1 << index) != 0
    }

    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.contains_index(weekday_index(day))
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

/// Monday-based index (0 = Monday, 6 = Sunday).
#[must_use]
pub fn weekday_index(day: Weekday) -> u8 {
    #[allow(clippy::cast_possible_truncation)]
    let index = day.num_days_from_monday() as u8;
    index
}

/// Monday-based index of the given date.
#[must_use]
pub fn date_weekday_index(date: NaiveDate) -> u8 {
    weekday_index(date.weekday())
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawDay {
            Text(String),
            Number(u8),
        }

        let raw = Vec::<RawDay>::deserialize(deserializer)?;
        let mut indices = Vec::with_capacity(raw.len());
        for day in raw {
            let index = match day {
                RawDay::Text(text) => WeekdaySet::parse_index(&text),
                RawDay::Number(n) => WeekdaySet::parse_index(&n.to_string()),
            }
            .map_err(serde::de::Error::custom)?;
            indices.push(index);
        }
        WeekdaySet::from_indices(indices).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let days: Vec<String> = (0..=6u8)
            .filter(|i| self.contains_index(*i))
            .map(|i| i.to_string())
            .collect();
        write!(f, "[{}]", days.join(","))
    }
}
