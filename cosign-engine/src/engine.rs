//! Authorization engine — the quorum state machine over registry, ledger and escrow.
//!
//! A transfer is `Pending` until its confirmation count reaches [`QUORUM`],
//! then `Executed` forever. Every precondition of a call is checked before
//! the call writes anything, so a failed call leaves no trace.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::broadcast;

use cosign_core::{Amount, EngineEvent, Principal, TransferId, TransferRequest, TransferSummary, QUORUM};

use crate::error::Participant;
use crate::{EngineConfig, EngineError, EscrowAccount, TransactionLedger, ValidatorRegistry};

/// Result of a successful confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Confirmation {
    /// The confirmed transfer.
    pub id: TransferId,
    /// Confirmation count after this call.
    pub confirmations: u32,
    /// Whether this call reached quorum and released the funds.
    pub executed: bool,
}

/// A release decided by the commit phase of [`AuthorizationEngine::confirm`].
#[derive(Debug, Clone, Copy)]
struct Release {
    recipient: Principal,
    amount: Amount,
}

/// Consistent copy of the whole engine state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct EngineSnapshot {
    pub owner: Principal,
    pub validators: Vec<Principal>,
    pub requests: Vec<TransferRequest>,
    pub pending: Vec<TransferId>,
    pub escrow_balance: Amount,
    pub payouts: BTreeMap<Principal, Amount>,
}

/// Orchestrates transfer creation, confirmation, quorum detection and release.
///
/// Exclusively owns the registry, the ledger, the escrow and the record of
/// released value. Mutations take `&mut self`; wrap the engine in
/// [`SharedEngine`](crate::SharedEngine) to serialize access across threads.
#[derive(Debug)]
pub struct AuthorizationEngine {
    registry: ValidatorRegistry,
    ledger: TransactionLedger,
    escrow: EscrowAccount,
    payouts: BTreeMap<Principal, Amount>,
    events: broadcast::Sender<EngineEvent>,
}

impl AuthorizationEngine {
    /// Create an engine with zero escrow, owned by `config.owner`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            registry: ValidatorRegistry::new(config.owner),
            ledger: TransactionLedger::new(),
            escrow: EscrowAccount::new(),
            payouts: BTreeMap::new(),
            events,
        }
    }

    /// Subscribe to notifications published after each committed change.
    ///
    /// Only events sent after this call are received.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// The fixed owner principal.
    #[must_use]
    pub fn owner(&self) -> Principal {
        self.registry.owner()
    }

    /// Explicitly added validators in insertion order.
    #[must_use]
    pub fn validators(&self) -> &[Principal] {
        self.registry.members()
    }

    /// Register a validator. Only the owner may call this.
    ///
    /// # Errors
    /// Returns [`EngineError::Unauthorized`], [`EngineError::InvalidPrincipal`]
    /// or [`EngineError::AlreadyMember`].
    pub fn add_validator(
        &mut self,
        caller: Principal,
        validator: Principal,
    ) -> Result<(), EngineError> {
        self.registry
            .add_validator(caller, validator)
            .inspect_err(|e| tracing::warn!(%caller, %validator, error = %e, "add validator rejected"))?;

        tracing::info!(%validator, "validator added");
        self.publish(EngineEvent::ValidatorAdded { validator });
        Ok(())
    }

    /// Returns `true` iff `principal` is the owner or an added validator.
    #[must_use]
    pub fn is_validator(&self, principal: &Principal) -> bool {
        self.registry.is_validator(principal)
    }

    /// Lock `deposited` in escrow and open a pending transfer to `recipient`.
    ///
    /// Any principal may initiate. The recipient may be any principal,
    /// validator or not.
    ///
    /// # Errors
    /// Returns [`EngineError::AmountMismatch`] if `deposited != amount` and
    /// [`EngineError::ZeroAmount`] if `amount` is zero.
    pub fn initiate_transfer(
        &mut self,
        caller: Principal,
        recipient: Principal,
        amount: Amount,
        deposited: Amount,
    ) -> Result<TransferId, EngineError> {
        Self::check_initiate(&self.escrow, amount, deposited)
            .inspect_err(|e| tracing::warn!(%caller, %recipient, error = %e, "transfer rejected"))?;

        let id = self.ledger.create_request(caller, recipient, amount);
        self.escrow.credit(amount)?;

        tracing::info!(%id, sender = %caller, %recipient, %amount, "transfer created");
        self.publish(EngineEvent::TransactionCreated { sender: caller, recipient, amount, id });
        Ok(id)
    }

    fn check_initiate(
        escrow: &EscrowAccount,
        amount: Amount,
        deposited: Amount,
    ) -> Result<(), EngineError> {
        if deposited != amount {
            return Err(EngineError::AmountMismatch { amount, deposited });
        }
        if amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }
        escrow.balance().checked_add(amount)?;
        Ok(())
    }

    /// Confirm a pending transfer as `caller`.
    ///
    /// The confirmation that reaches [`QUORUM`] executes the transfer: the
    /// executed flag is set and the request leaves the pending view before
    /// the amount moves from escrow to the recipient.
    ///
    /// # Errors
    /// Checked in this order: [`EngineError::Unauthorized`],
    /// [`EngineError::NotFound`], [`EngineError::SelfApprovalForbidden`] for
    /// the sender then the recipient, [`EngineError::AlreadyConfirmed`],
    /// [`EngineError::AlreadyExecuted`].
    pub fn confirm(&mut self, caller: Principal, id: TransferId) -> Result<Confirmation, EngineError> {
        self.check_confirm(caller, id)
            .inspect_err(|e| tracing::warn!(%caller, %id, error = %e, "confirmation rejected"))?;

        let (confirmations, release) = self.commit_confirmation(caller, id)?;
        tracing::info!(%id, validator = %caller, confirmations, "confirmation recorded");
        self.publish(EngineEvent::TransactionConfirmed { id, validator: caller, confirmations });

        let Some(release) = release else {
            return Ok(Confirmation { id, confirmations, executed: false });
        };

        self.release(release).inspect_err(|e| {
            tracing::error!(%id, error = %e, "escrow invariant violated during release");
        })?;
        tracing::info!(%id, recipient = %release.recipient, amount = %release.amount, "transfer executed");
        self.publish(EngineEvent::TransactionExecuted {
            id,
            recipient: release.recipient,
            amount: release.amount,
        });
        Ok(Confirmation { id, confirmations, executed: true })
    }

    fn check_confirm(&self, caller: Principal, id: TransferId) -> Result<(), EngineError> {
        if !self.registry.is_validator(&caller) {
            return Err(EngineError::Unauthorized { caller });
        }
        let request = self.ledger.get(id)?;
        if request.sender == caller {
            return Err(EngineError::SelfApprovalForbidden { id, role: Participant::Sender });
        }
        if request.recipient == caller {
            return Err(EngineError::SelfApprovalForbidden { id, role: Participant::Recipient });
        }
        if request.has_confirmed(&caller) {
            return Err(EngineError::AlreadyConfirmed { id, validator: caller });
        }
        if request.executed {
            return Err(EngineError::AlreadyExecuted(id));
        }
        if request.confirmations + 1 >= QUORUM {
            if !self.escrow.covers(request.amount) {
                return Err(EngineError::InsufficientFunds {
                    requested: request.amount,
                    available: self.escrow.balance(),
                });
            }
            self.released_to(&request.recipient).checked_add(request.amount)?;
        }
        Ok(())
    }

    /// Record the confirmation. On reaching quorum, settle the request
    /// irreversibly and hand back the release to perform.
    fn commit_confirmation(
        &mut self,
        caller: Principal,
        id: TransferId,
    ) -> Result<(u32, Option<Release>), EngineError> {
        let request = self.ledger.get_mut(id)?;
        request.confirmed_by.insert(caller);
        request.confirmations += 1;
        let confirmations = request.confirmations;
        if confirmations < QUORUM {
            return Ok((confirmations, None));
        }

        request.executed = true;
        request.executed_at = Some(Utc::now());
        let release = Release { recipient: request.recipient, amount: request.amount };
        self.ledger.mark_settled(id);
        Ok((confirmations, Some(release)))
    }

    fn release(&mut self, release: Release) -> Result<(), EngineError> {
        self.escrow.debit(release.amount)?;
        let paid = self.payouts.entry(release.recipient).or_default();
        *paid = paid.checked_add(release.amount)?;
        Ok(())
    }

    /// Pending transfers in creation order. Validators only.
    ///
    /// # Errors
    /// Returns [`EngineError::Unauthorized`] if `caller` is not a validator.
    pub fn pending_transactions(&self, caller: Principal) -> Result<Vec<TransferSummary>, EngineError> {
        if !self.registry.is_validator(&caller) {
            tracing::warn!(%caller, "pending listing rejected");
            return Err(EngineError::Unauthorized { caller });
        }
        Ok(self.ledger.pending().map(TransferRequest::summary).collect())
    }

    /// Full details of one transfer.
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] for an unknown identifier.
    pub fn transaction_details(&self, id: TransferId) -> Result<&TransferRequest, EngineError> {
        self.ledger.get(id)
    }

    /// Number of transfers ever created, executed ones included.
    #[must_use]
    pub fn total_transactions(&self) -> u64 {
        self.ledger.next_id().value()
    }

    /// Value currently held in escrow.
    #[must_use]
    pub fn escrow_balance(&self) -> Amount {
        self.escrow.balance()
    }

    /// Total value released to `principal` by executed transfers.
    #[must_use]
    pub fn released_to(&self, principal: &Principal) -> Amount {
        self.payouts.get(principal).copied().unwrap_or_default()
    }

    /// Copy the full state for auditing or export.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            owner: self.registry.owner(),
            validators: self.registry.members().to_vec(),
            requests: self.ledger.requests().to_vec(),
            pending: self.ledger.pending_ids(),
            escrow_balance: self.escrow.balance(),
            payouts: self.payouts.clone(),
        }
    }

    fn publish(&self, event: EngineEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Principal = Principal::new([0xaa; 20]);
    const V2: Principal = Principal::new([0x02; 20]);
    const V3: Principal = Principal::new([0x03; 20]);
    const FROM: Principal = Principal::new([0x04; 20]);
    const TO: Principal = Principal::new([0x05; 20]);

    fn engine() -> AuthorizationEngine {
        AuthorizationEngine::new(&EngineConfig::new(OWNER))
    }

    fn initiate(engine: &mut AuthorizationEngine, from: Principal, to: Principal, units: u128) -> TransferId {
        match engine.initiate_transfer(from, to, Amount::new(units), Amount::new(units)) {
            Ok(id) => id,
            Err(e) => panic!("initiate failed: {e}"),
        }
    }

    #[test]
    fn initiate_credits_escrow_and_opens_pending() {
        let mut engine = engine();
        let id = initiate(&mut engine, FROM, TO, 10);
        assert_eq!(id, TransferId::new(0));
        assert_eq!(engine.escrow_balance(), Amount::new(10));
        assert_eq!(engine.total_transactions(), 1);
        let pending = match engine.pending_transactions(OWNER) {
            Ok(p) => p,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
    }

    #[test]
    fn initiate_rejects_mismatched_deposit_without_writing() {
        let mut engine = engine();
        let result = engine.initiate_transfer(FROM, TO, Amount::new(2), Amount::new(1));
        assert_eq!(
            result,
            Err(EngineError::AmountMismatch { amount: Amount::new(2), deposited: Amount::new(1) })
        );
        assert_eq!(engine.total_transactions(), 0);
        assert_eq!(engine.escrow_balance(), Amount::ZERO);
    }

    #[test]
    fn initiate_rejects_zero_amount() {
        let mut engine = engine();
        assert_eq!(
            engine.initiate_transfer(FROM, TO, Amount::ZERO, Amount::ZERO),
            Err(EngineError::ZeroAmount)
        );
        assert_eq!(engine.total_transactions(), 0);
    }

    #[test]
    fn second_confirmation_executes_and_releases() {
        let mut engine = engine();
        assert!(engine.add_validator(OWNER, V2).is_ok());
        let id = initiate(&mut engine, FROM, TO, 3);

        let first = match engine.confirm(OWNER, id) {
            Ok(c) => c,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(first, Confirmation { id, confirmations: 1, executed: false });
        assert_eq!(engine.escrow_balance(), Amount::new(3));
        assert_eq!(engine.released_to(&TO), Amount::ZERO);

        let second = match engine.confirm(V2, id) {
            Ok(c) => c,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(second, Confirmation { id, confirmations: 2, executed: true });
        assert_eq!(engine.escrow_balance(), Amount::ZERO);
        assert_eq!(engine.released_to(&TO), Amount::new(3));

        let details = match engine.transaction_details(id) {
            Ok(d) => d,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert!(details.executed);
        assert!(details.executed_at.is_some());
        assert_eq!(details.confirmations, 2);
    }

    #[test]
    fn confirm_after_execution_fails_and_releases_once() {
        let mut engine = engine();
        assert!(engine.add_validator(OWNER, V2).is_ok());
        assert!(engine.add_validator(OWNER, V3).is_ok());
        let id = initiate(&mut engine, FROM, TO, 1);
        assert!(engine.confirm(OWNER, id).is_ok());
        assert!(engine.confirm(V2, id).is_ok());

        assert_eq!(engine.confirm(V3, id), Err(EngineError::AlreadyExecuted(id)));
        assert_eq!(
            engine.confirm(V2, id),
            Err(EngineError::AlreadyConfirmed { id, validator: V2 })
        );
        assert_eq!(engine.released_to(&TO), Amount::new(1), "release must happen exactly once");
        assert_eq!(engine.transaction_details(id).map(|r| r.confirmations), Ok(2));
    }

    #[test]
    fn confirm_checks_run_in_order() {
        let mut engine = engine();
        assert!(engine.add_validator(OWNER, V2).is_ok());

        // Non-validator on an unknown id: authorization is reported first.
        assert_eq!(
            engine.confirm(FROM, TransferId::new(9)),
            Err(EngineError::Unauthorized { caller: FROM })
        );
        assert_eq!(
            engine.confirm(OWNER, TransferId::new(9)),
            Err(EngineError::NotFound(TransferId::new(9)))
        );

        // Validator that is both sender and recipient: sender wins.
        let id = initiate(&mut engine, V2, V2, 1);
        assert_eq!(
            engine.confirm(V2, id),
            Err(EngineError::SelfApprovalForbidden { id, role: Participant::Sender })
        );
    }

    #[test]
    fn rejected_confirmation_does_not_mutate() {
        let mut engine = engine();
        let id = initiate(&mut engine, OWNER, TO, 1);
        let before = engine.snapshot();
        assert!(engine.confirm(OWNER, id).is_err());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn pending_transactions_requires_validator() {
        let engine = engine();
        assert_eq!(
            engine.pending_transactions(FROM),
            Err(EngineError::Unauthorized { caller: FROM })
        );
        assert_eq!(engine.pending_transactions(OWNER), Ok(Vec::new()));
    }

    #[test]
    fn events_follow_committed_changes() {
        let mut engine = engine();
        let mut rx = engine.subscribe();
        assert!(engine.add_validator(OWNER, V2).is_ok());
        assert!(engine.add_validator(OWNER, V2).is_err());
        let id = initiate(&mut engine, FROM, TO, 4);
        assert!(engine.confirm(OWNER, id).is_ok());
        assert!(engine.confirm(V2, id).is_ok());

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                EngineEvent::ValidatorAdded { validator: V2 },
                EngineEvent::TransactionCreated {
                    sender: FROM,
                    recipient: TO,
                    amount: Amount::new(4),
                    id,
                },
                EngineEvent::TransactionConfirmed { id, validator: OWNER, confirmations: 1 },
                EngineEvent::TransactionConfirmed { id, validator: V2, confirmations: 2 },
                EngineEvent::TransactionExecuted { id, recipient: TO, amount: Amount::new(4) },
            ],
            "failed calls must not publish"
        );
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let mut engine = engine();
        assert!(engine.add_validator(OWNER, V2).is_ok(), "no subscriber must not fail the call");
    }
}
