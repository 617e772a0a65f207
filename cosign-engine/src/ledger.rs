//! Transaction ledger: every transfer request ever created.
//!
//! A pure data store. Access control lives in the engine.

use std::collections::BTreeSet;

use cosign_core::{Amount, Principal, TransferId, TransferRequest};

use crate::EngineError;

/// Ordered store of transfer requests plus an index of the pending ones.
///
/// Requests are never deleted. The pending index is maintained
/// incrementally so queries do not rescan the full ledger.
#[derive(Debug, Clone, Default)]
pub struct TransactionLedger {
    requests: Vec<TransferRequest>,
    pending: BTreeSet<TransferId>,
}

impl TransactionLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier the next request will receive.
    #[must_use]
    pub fn next_id(&self) -> TransferId {
        TransferId::new(self.requests.len() as u64)
    }

    /// Store a new pending request and return its identifier.
    pub fn create_request(
        &mut self,
        sender: Principal,
        recipient: Principal,
        amount: Amount,
    ) -> TransferId {
        let id = self.next_id();
        self.requests.push(TransferRequest::new(id, sender, recipient, amount));
        self.pending.insert(id);
        id
    }

    /// Look up a request.
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] for an unknown identifier.
    pub fn get(&self, id: TransferId) -> Result<&TransferRequest, EngineError> {
        usize::try_from(id.value())
            .ok()
            .and_then(|idx| self.requests.get(idx))
            .ok_or(EngineError::NotFound(id))
    }

    /// Mutable lookup, for the engine only.
    pub(crate) fn get_mut(&mut self, id: TransferId) -> Result<&mut TransferRequest, EngineError> {
        usize::try_from(id.value())
            .ok()
            .and_then(|idx| self.requests.get_mut(idx))
            .ok_or(EngineError::NotFound(id))
    }

    /// Drop `id` from the pending index once it has executed.
    pub(crate) fn mark_settled(&mut self, id: TransferId) {
        self.pending.remove(&id);
    }

    /// Identifiers of non-executed requests, in creation order.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<TransferId> {
        self.pending.iter().copied().collect()
    }

    /// Non-executed requests, in creation order.
    pub fn pending(&self) -> impl Iterator<Item = &TransferRequest> + '_ {
        self.pending.iter().filter_map(|id| self.get(*id).ok())
    }

    /// Total number of requests ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns `true` if no request was ever created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Every request, in creation order.
    #[must_use]
    pub fn requests(&self) -> &[TransferRequest] {
        &self.requests
    }
}
