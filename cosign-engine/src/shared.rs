//! Thread-safe handle serializing every mutation of one engine.
//!
//! Mutations hold the write lock for their whole check-commit-release
//! sequence, so readers only ever see a request before or after a call,
//! never in between.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use cosign_core::{Amount, EngineEvent, Principal, TransferId, TransferRequest, TransferSummary};

use crate::{AuthorizationEngine, Confirmation, EngineConfig, EngineError, EngineSnapshot};

/// Single-writer, many-reader wrapper around an [`AuthorizationEngine`].
#[derive(Debug)]
pub struct SharedEngine {
    inner: RwLock<AuthorizationEngine>,
}

impl SharedEngine {
    /// Create a shared engine from `config`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self::from_engine(AuthorizationEngine::new(config))
    }

    /// Wrap an existing engine.
    #[must_use]
    pub fn from_engine(engine: AuthorizationEngine) -> Self {
        Self { inner: RwLock::new(engine) }
    }

    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    fn read(&self) -> RwLockReadGuard<'_, AuthorizationEngine> {
        self.inner.read().expect("engine read lock poisoned")
    }

    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    fn write(&self) -> RwLockWriteGuard<'_, AuthorizationEngine> {
        self.inner.write().expect("engine write lock poisoned")
    }

    /// See [`AuthorizationEngine::subscribe`].
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.read().subscribe()
    }

    /// See [`AuthorizationEngine::owner`].
    #[must_use]
    pub fn owner(&self) -> Principal {
        self.read().owner()
    }

    /// See [`AuthorizationEngine::validators`].
    #[must_use]
    pub fn validators(&self) -> Vec<Principal> {
        self.read().validators().to_vec()
    }

    /// See [`AuthorizationEngine::add_validator`].
    ///
    /// # Errors
    /// Propagates errors from [`AuthorizationEngine::add_validator`].
    pub fn add_validator(&self, caller: Principal, validator: Principal) -> Result<(), EngineError> {
        self.write().add_validator(caller, validator)
    }

    /// See [`AuthorizationEngine::is_validator`].
    #[must_use]
    pub fn is_validator(&self, principal: &Principal) -> bool {
        self.read().is_validator(principal)
    }

    /// See [`AuthorizationEngine::initiate_transfer`].
    ///
    /// # Errors
    /// Propagates errors from [`AuthorizationEngine::initiate_transfer`].
    pub fn initiate_transfer(
        &self,
        caller: Principal,
        recipient: Principal,
        amount: Amount,
        deposited: Amount,
    ) -> Result<TransferId, EngineError> {
        self.write().initiate_transfer(caller, recipient, amount, deposited)
    }

    /// See [`AuthorizationEngine::confirm`].
    ///
    /// # Errors
    /// Propagates errors from [`AuthorizationEngine::confirm`].
    pub fn confirm(&self, caller: Principal, id: TransferId) -> Result<Confirmation, EngineError> {
        self.write().confirm(caller, id)
    }

    /// See [`AuthorizationEngine::pending_transactions`].
    ///
    /// # Errors
    /// Propagates errors from [`AuthorizationEngine::pending_transactions`].
    pub fn pending_transactions(&self, caller: Principal) -> Result<Vec<TransferSummary>, EngineError> {
        self.read().pending_transactions(caller)
    }

    /// Owned copy of [`AuthorizationEngine::transaction_details`].
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] for an unknown identifier.
    pub fn transaction_details(&self, id: TransferId) -> Result<TransferRequest, EngineError> {
        self.read().transaction_details(id).cloned()
    }

    /// See [`AuthorizationEngine::total_transactions`].
    #[must_use]
    pub fn total_transactions(&self) -> u64 {
        self.read().total_transactions()
    }

    /// See [`AuthorizationEngine::escrow_balance`].
    #[must_use]
    pub fn escrow_balance(&self) -> Amount {
        self.read().escrow_balance()
    }

    /// See [`AuthorizationEngine::released_to`].
    #[must_use]
    pub fn released_to(&self, principal: &Principal) -> Amount {
        self.read().released_to(principal)
    }

    /// See [`AuthorizationEngine::snapshot`].
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        self.read().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    const OWNER: Principal = Principal::new([0xaa; 20]);
    const V2: Principal = Principal::new([0x02; 20]);

    #[test]
    fn concurrent_confirmations_execute_exactly_once() {
        let engine = Arc::new(SharedEngine::new(&EngineConfig::new(OWNER)));
        let validators: Vec<Principal> = (10u8..18).map(|b| Principal::new([b; 20])).collect();
        for v in &validators {
            assert!(engine.add_validator(OWNER, *v).is_ok());
        }
        let id = match engine.initiate_transfer(V2, OWNER, Amount::new(5), Amount::new(5)) {
            Ok(id) => id,
            Err(e) => panic!("initiate failed: {e}"),
        };

        let handles: Vec<_> = validators
            .iter()
            .map(|v| {
                let engine = Arc::clone(&engine);
                let v = *v;
                thread::spawn(move || engine.confirm(v, id))
            })
            .collect();

        let mut executed = 0;
        let mut accepted = 0;
        for handle in handles {
            match handle.join() {
                Ok(Ok(c)) => {
                    accepted += 1;
                    if c.executed {
                        executed += 1;
                    }
                }
                Ok(Err(e)) => assert_eq!(e, EngineError::AlreadyExecuted(id)),
                Err(_) => panic!("confirm thread panicked"),
            }
        }

        assert_eq!(accepted, 2, "exactly quorum confirmations are accepted");
        assert_eq!(executed, 1, "exactly one confirmation executes");
        assert_eq!(engine.released_to(&OWNER), Amount::new(5));
        assert_eq!(engine.escrow_balance(), Amount::ZERO);
    }

    #[test]
    fn transaction_details_is_an_owned_copy() {
        let engine = SharedEngine::new(&EngineConfig::new(OWNER));
        let id = match engine.initiate_transfer(V2, V2, Amount::new(1), Amount::new(1)) {
            Ok(id) => id,
            Err(e) => panic!("initiate failed: {e}"),
        };
        let details = match engine.transaction_details(id) {
            Ok(d) => d,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(details.id, id);
        assert_eq!(engine.transaction_details(TransferId::new(1)), Err(EngineError::NotFound(TransferId::new(1))));
    }
}
