use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of distinct validator confirmations that executes a transfer.
///
/// Fixed regardless of how many validators are registered.
pub const QUORUM: u32 = 2;

/// A non-negative quantity of value, in the smallest indivisible unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Amount(pub u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an `Amount` from a raw unit count.
    #[must_use]
    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// Returns the raw unit count.
    #[must_use]
    pub fn units(self) -> u128 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts.
    ///
    /// # Errors
    /// Returns [`CoreError::AmountOverflow`] if the sum does not fit in `u128`.
    pub fn checked_add(self, rhs: Self) -> Result<Self, CoreError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(CoreError::AmountOverflow { lhs: self.0, rhs: rhs.0 })
    }

    /// Subtracts `rhs` from this amount.
    ///
    /// # Errors
    /// Returns [`CoreError::AmountUnderflow`] if `rhs` exceeds this amount.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, CoreError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(CoreError::AmountUnderflow { lhs: self.0, rhs: rhs.0 })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}
