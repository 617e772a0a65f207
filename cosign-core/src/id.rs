use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Length in bytes of a [`Principal`].
pub const PRINCIPAL_LEN: usize = 20;

/// An opaque, address-like identity that can deposit, receive, or approve value.
///
/// The all-zero principal is the null principal: it can never be a validator.
/// Text form is `0x` followed by 40 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub struct Principal(pub [u8; PRINCIPAL_LEN]);

impl Principal {
    /// The null principal.
    pub const ZERO: Self = Self([0u8; PRINCIPAL_LEN]);

    /// Creates a `Principal` from its raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; PRINCIPAL_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PRINCIPAL_LEN] {
        &self.0
    }

    /// Returns `true` for the null principal.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; PRINCIPAL_LEN]
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Principal {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != PRINCIPAL_LEN * 2 {
            return Err(CoreError::InvalidPrincipal {
                input: s.to_owned(),
                reason: format!("expected {} hex digits, got {}", PRINCIPAL_LEN * 2, digits.len()),
            });
        }
        let mut bytes = [0u8; PRINCIPAL_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| CoreError::InvalidPrincipal {
            input: s.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl From<[u8; PRINCIPAL_LEN]> for Principal {
    fn from(bytes: [u8; PRINCIPAL_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Sequential identifier of a transfer request.
///
/// Allocated from 0 upwards and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[non_exhaustive]
pub struct TransferId(pub u64);

impl TransferId {
    /// Creates a `TransferId` from its numeric value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns the identifier that follows this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TransferId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
