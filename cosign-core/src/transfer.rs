use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::{Amount, QUORUM};
use crate::id::{Principal, TransferId};

/// A proposed release of escrowed value to a recipient.
///
/// The amount is fixed at creation. `executed` flips to `true` exactly once,
/// at the confirmation that reaches [`QUORUM`], and never flips back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TransferRequest {
    /// Sequential identifier, starting at 0.
    pub id: TransferId,
    /// The principal that deposited the value.
    pub sender: Principal,
    /// The principal the value is released to.
    pub recipient: Principal,
    /// Value locked in escrow for this request.
    pub amount: Amount,
    /// Whether quorum was reached and the value released.
    pub executed: bool,
    /// Number of distinct validators that confirmed.
    pub confirmations: u32,
    /// Validators that confirmed, each at most once.
    pub confirmed_by: BTreeSet<Principal>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When quorum was reached, if it has been.
    pub executed_at: Option<DateTime<Utc>>,
}

impl TransferRequest {
    /// Create a new pending request with no confirmations.
    #[must_use]
    pub fn new(id: TransferId, sender: Principal, recipient: Principal, amount: Amount) -> Self {
        Self {
            id,
            sender,
            recipient,
            amount,
            executed: false,
            confirmations: 0,
            confirmed_by: BTreeSet::new(),
            created_at: Utc::now(),
            executed_at: None,
        }
    }

    /// Returns `true` while the request awaits quorum.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.executed
    }

    /// Returns `true` if `validator` already confirmed this request.
    #[must_use]
    pub fn has_confirmed(&self, validator: &Principal) -> bool {
        self.confirmed_by.contains(validator)
    }

    /// Returns `true` if `principal` is the sender or the recipient.
    #[must_use]
    pub fn is_participant(&self, principal: &Principal) -> bool {
        self.sender == *principal || self.recipient == *principal
    }

    /// Confirmations still needed before execution.
    #[must_use]
    pub fn remaining_confirmations(&self) -> u32 {
        QUORUM.saturating_sub(self.confirmations)
    }

    /// Returns the public summary of this request.
    #[must_use]
    pub fn summary(&self) -> TransferSummary {
        TransferSummary {
            id: self.id,
            sender: self.sender,
            recipient: self.recipient,
            amount: self.amount,
            executed: self.executed,
            confirmations: self.confirmations,
        }
    }
}

/// Flat view of a [`TransferRequest`] without its confirmation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TransferSummary {
    pub id: TransferId,
    pub sender: Principal,
    pub recipient: Principal,
    pub amount: Amount,
    pub executed: bool,
    pub confirmations: u32,
}
