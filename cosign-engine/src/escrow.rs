//! Escrow balance held on behalf of pending transfers.

use cosign_core::Amount;

use crate::EngineError;

/// Single balance counter. Mutated only by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscrowAccount {
    balance: Amount,
}

impl EscrowAccount {
    /// Create an empty escrow.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance.
    #[must_use]
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Returns `true` if a debit of `amount` would succeed.
    #[must_use]
    pub fn covers(&self, amount: Amount) -> bool {
        amount <= self.balance
    }

    pub(crate) fn credit(&mut self, amount: Amount) -> Result<(), EngineError> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    pub(crate) fn debit(&mut self, amount: Amount) -> Result<(), EngineError> {
        if !self.covers(amount) {
            return Err(EngineError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }
}
