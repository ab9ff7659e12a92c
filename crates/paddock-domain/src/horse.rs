//! Horse domain rules: gender, age, and the display label derived from both.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Horses younger than this many whole years are labelled colt or filly.
pub const YOUTH_AGE_LIMIT: u32 = 3;

/// Recorded sex of a horse.
///
/// Wire format: snake_case string. Storage format: `i16` (1 = Stallion, 2 = Gelding, 3 = Mare).
/// `0` is reserved as "invalid" and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Stallion = 1,
    Gelding = 2,
    Mare = 3,
}

/// Error returned when a stored or submitted gender value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid gender: {0}")]
pub struct InvalidGender(pub String);

impl Gender {
    /// Convert from the stored `i16` value. Returns `None` for unknown values.
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            1 => Some(Self::Stallion),
            2 => Some(Self::Gelding),
            3 => Some(Self::Mare),
            _ => None,
        }
    }

    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// Display label for a horse of this gender at the given age.
    pub fn label(self, age_years: u32) -> &'static str {
        let youth = age_years < YOUTH_AGE_LIMIT;
        match self {
            Self::Stallion if youth => "Colt",
            Self::Stallion => "Stallion",
            Self::Gelding => "Gelding",
            Self::Mare if youth => "Filly",
            Self::Mare => "Mare",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = InvalidGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stallion" => Ok(Self::Stallion),
            "gelding" => Ok(Self::Gelding),
            "mare" => Ok(Self::Mare),
            _ => Err(InvalidGender(s.to_owned())),
        }
    }
}

/// Whole years elapsed between `date_of_birth` and `today`.
///
/// A birthday later in the year than `today` does not count yet. Dates of
/// birth in the future yield `0`.
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    if date_of_birth >= today {
        return 0;
    }
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Parse a submitted `YYYY-MM-DD` date of birth.
pub fn parse_date_of_birth(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
