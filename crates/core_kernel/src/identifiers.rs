//! Strongly-typed identifiers for server-assigned records
//!
//! The CRM service assigns positive integer keys to clients and policies.
//! Newtype wrappers keep the two from being mixed up and guarantee that a
//! constructed identifier is always a valid reference (strictly positive).

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when an identifier cannot be built from raw input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    #[error("Identifier is empty")]
    Empty,

    #[error("Identifier is not an integer: {0}")]
    NotANumber(String),

    #[error("Identifier must be positive, got {0}")]
    NotPositive(i64),
}

macro_rules! define_id {
    ($name:ident, $entity:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier, rejecting zero and negative values
            pub fn new(value: i64) -> Result<Self, ParseIdError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(ParseIdError::NotPositive(value))
                }
            }

            /// Returns the raw key
            pub fn get(&self) -> i64 {
                self.0
            }

            /// Returns the entity name used in messages
            pub fn entity() -> &'static str {
                $entity
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError::Empty);
                }
                let value: i64 = trimmed
                    .parse()
                    .map_err(|_| ParseIdError::NotANumber(trimmed.to_string()))?;
                Self::new(value)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ParseIdError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = i64::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

define_id!(ClientId, "Client");
define_id!(PolicyId, "Policy");
