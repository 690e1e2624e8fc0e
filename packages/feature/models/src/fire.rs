//! Fire numbers and the wildfire districts they encode.
//!
//! A fire number such as `C50903` starts with a district letter; its first
//! two characters form the fire code used in the season folder layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Wildfire service districts, keyed by the first letter of a fire number.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum District {
    Cariboo,
    Coastal,
    Kamloops,
    NorthWest,
    PrinceGeorge,
    SouthEast,
}

impl District {
    pub const ALL: &[Self] = &[
        Self::Cariboo,
        Self::Coastal,
        Self::Kamloops,
        Self::NorthWest,
        Self::PrinceGeorge,
        Self::SouthEast,
    ];

    /// Looks up a district by its fire number letter (case-insensitive).
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'C' => Some(Self::Cariboo),
            'V' => Some(Self::Coastal),
            'K' => Some(Self::Kamloops),
            'R' => Some(Self::NorthWest),
            'G' => Some(Self::PrinceGeorge),
            'N' => Some(Self::SouthEast),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Cariboo => 'C',
            Self::Coastal => 'V',
            Self::Kamloops => 'K',
            Self::NorthWest => 'R',
            Self::PrinceGeorge => 'G',
            Self::SouthEast => 'N',
        }
    }
}

/// Error returned when a string is not a usable fire number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidFireNumberError {
    Empty,
    /// The template placeholder (`FIRENUMBER`) was left in place.
    Placeholder(String),
    /// Fewer than two characters, or characters other than ASCII letters
    /// and digits.
    Malformed(String),
    UnknownDistrict { fire_number: String, code: char },
}

impl fmt::Display for InvalidFireNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("fire number is required"),
            Self::Placeholder(value) => {
                write!(f, "fire number '{value}' is still the FIRENUMBER placeholder")
            }
            Self::Malformed(value) => write!(f, "malformed fire number '{value}'"),
            Self::UnknownDistrict { fire_number, code } => {
                write!(f, "unknown district code '{code}' in fire number '{fire_number}'")
            }
        }
    }
}

impl std::error::Error for InvalidFireNumberError {}

/// A validated fire number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FireNumber {
    value: String,
    district: District,
}

impl FireNumber {
    /// Validates a fire number.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFireNumberError`] if the value is empty, still the
    /// `FIRENUMBER` placeholder, malformed, or starts with an unknown
    /// district letter.
    pub fn parse(value: &str) -> Result<Self, InvalidFireNumberError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(InvalidFireNumberError::Empty);
        }
        if value.to_ascii_uppercase().contains("FIRENUMBER") {
            return Err(InvalidFireNumberError::Placeholder(value.to_string()));
        }
        if value.len() < 2 || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidFireNumberError::Malformed(value.to_string()));
        }

        let code = value.chars().next().unwrap_or_default();
        let district =
            District::from_code(code).ok_or_else(|| InvalidFireNumberError::UnknownDistrict {
                fire_number: value.to_string(),
                code: code.to_ascii_uppercase(),
            })?;

        Ok(Self {
            value: value.to_string(),
            district,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn district(&self) -> District {
        self.district
    }

    /// The first two characters, e.g. `C5` for `C50903`.
    #[must_use]
    pub fn fire_code(&self) -> &str {
        &self.value[..2]
    }
}

impl fmt::Display for FireNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for FireNumber {
    type Err = InvalidFireNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FireNumber {
    type Error = InvalidFireNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FireNumber> for String {
    fn from(value: FireNumber) -> Self {
        value.value
    }
}
