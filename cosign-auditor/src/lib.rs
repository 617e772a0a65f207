//! Audit engine for verifying the escrow and quorum invariants of a cosign engine.
//!
//! Checks a consistent [`EngineSnapshot`] and reports the first invariant it
//! finds broken. A correct engine never produces a violation.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

use std::collections::BTreeSet;

use cosign_core::{Amount, CoreError, Principal, TransferId, QUORUM};
use cosign_engine::EngineSnapshot;

/// An invariant the audited state fails to uphold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AuditViolation {
    /// Request identifiers are not dense and ordered from 0.
    #[error("request at position {position} carries id {id}")]
    IdGap { position: usize, id: TransferId },

    /// Escrow does not equal the sum of non-executed amounts.
    #[error("escrow balance {balance} differs from pending total {pending_total}")]
    EscrowMismatch { balance: Amount, pending_total: Amount },

    /// Released value does not equal the sum of executed amounts per recipient.
    #[error("released to {recipient}: recorded {recorded}, expected {expected}")]
    PayoutMismatch { recipient: Principal, recorded: Amount, expected: Amount },

    /// The pending index disagrees with the executed flags.
    #[error("pending index disagrees with executed flags")]
    PendingIndexMismatch,

    /// Confirmation count does not match the confirmation set.
    #[error("transfer {id}: count {count} but {set_len} distinct confirmers")]
    ConfirmationCountMismatch { id: TransferId, count: u32, set_len: usize },

    /// A request executed below quorum, or stayed pending at quorum.
    #[error("transfer {id}: executed={executed} with {confirmations} confirmations")]
    QuorumMismatch { id: TransferId, executed: bool, confirmations: u32 },

    /// A participant confirmed its own transfer.
    #[error("transfer {id} confirmed by participant {principal}")]
    SelfApproval { id: TransferId, principal: Principal },

    /// A confirmer is not a validator.
    #[error("transfer {id} confirmed by non-validator {principal}")]
    UnauthorizedConfirmer { id: TransferId, principal: Principal },

    /// The null principal appears as a validator.
    #[error("zero principal registered as validator")]
    ZeroValidator,

    /// Summing amounts overflowed.
    #[error(transparent)]
    Arithmetic(#[from] CoreError),
}

/// Check every invariant of `snapshot`.
///
/// # Errors
/// Returns the first [`AuditViolation`] found.
pub fn audit(snapshot: &EngineSnapshot) -> Result<(), AuditViolation> {
    let validators: BTreeSet<Principal> =
        snapshot.validators.iter().copied().chain([snapshot.owner]).collect();
    if validators.contains(&Principal::ZERO) {
        return Err(AuditViolation::ZeroValidator);
    }

    let mut pending_total = Amount::ZERO;
    let mut expected_pending = Vec::new();
    let mut expected_payouts = std::collections::BTreeMap::<Principal, Amount>::new();

    for (position, request) in snapshot.requests.iter().enumerate() {
        if request.id.value() != position as u64 {
            return Err(AuditViolation::IdGap { position, id: request.id });
        }
        if request.confirmed_by.len() != request.confirmations as usize {
            return Err(AuditViolation::ConfirmationCountMismatch {
                id: request.id,
                count: request.confirmations,
                set_len: request.confirmed_by.len(),
            });
        }
        if request.executed != (request.confirmations >= QUORUM) {
            return Err(AuditViolation::QuorumMismatch {
                id: request.id,
                executed: request.executed,
                confirmations: request.confirmations,
            });
        }
        for confirmer in &request.confirmed_by {
            if request.is_participant(confirmer) {
                return Err(AuditViolation::SelfApproval { id: request.id, principal: *confirmer });
            }
            if !validators.contains(confirmer) {
                return Err(AuditViolation::UnauthorizedConfirmer {
                    id: request.id,
                    principal: *confirmer,
                });
            }
        }

        if request.executed {
            let paid = expected_payouts.entry(request.recipient).or_default();
            *paid = paid.checked_add(request.amount)?;
        } else {
            pending_total = pending_total.checked_add(request.amount)?;
            expected_pending.push(request.id);
        }
    }

    if snapshot.pending != expected_pending {
        return Err(AuditViolation::PendingIndexMismatch);
    }
    if snapshot.escrow_balance != pending_total {
        return Err(AuditViolation::EscrowMismatch {
            balance: snapshot.escrow_balance,
            pending_total,
        });
    }

    let recipients: BTreeSet<Principal> =
        expected_payouts.keys().chain(snapshot.payouts.keys()).copied().collect();
    for recipient in recipients {
        let recorded = snapshot.payouts.get(&recipient).copied().unwrap_or_default();
        let expected = expected_payouts.get(&recipient).copied().unwrap_or_default();
        if recorded != expected {
            return Err(AuditViolation::PayoutMismatch { recipient, recorded, expected });
        }
    }

    Ok(())
}
