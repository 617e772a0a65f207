//! Error types for the engine crate.

use std::fmt;

use cosign_core::{Amount, CoreError, Principal, TransferId};
use serde::Serialize;

/// Which side of a transfer a validator was found to be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Participant {
    Sender,
    Recipient,
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Sender => f.write_str("sender"),
            Participant::Recipient => f.write_str("recipient"),
        }
    }
}

/// Errors returned by registry, ledger, escrow and engine operations.
///
/// Every variant is reported before any state is written for the failing call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Caller lacks the role the operation requires.
    #[error("unauthorized caller {caller}")]
    Unauthorized { caller: Principal },

    /// The null principal was supplied where a real one is required.
    #[error("principal cannot be the zero address")]
    InvalidPrincipal,

    /// The principal is already a validator.
    #[error("validator {0} already added")]
    AlreadyMember(Principal),

    /// The validator already confirmed this transfer.
    #[error("validator {validator} already confirmed transfer {id}")]
    AlreadyConfirmed { id: TransferId, validator: Principal },

    /// No transfer exists with this identifier.
    #[error("transfer {0} does not exist")]
    NotFound(TransferId),

    /// The deposited value differs from the declared amount.
    #[error("deposit {deposited} does not match amount {amount}")]
    AmountMismatch { amount: Amount, deposited: Amount },

    /// A transfer must move a positive amount.
    #[error("transfer amount must be positive")]
    ZeroAmount,

    /// The validator is a participant in the transfer it tried to confirm.
    #[error("validator cannot be the {role} of transfer {id}")]
    SelfApprovalForbidden { id: TransferId, role: Participant },

    /// The transfer already reached quorum.
    #[error("transfer {0} already executed")]
    AlreadyExecuted(TransferId),

    /// Escrow cannot cover a release. Indicates a broken internal invariant.
    #[error("insufficient escrow: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    /// Amount arithmetic failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}
