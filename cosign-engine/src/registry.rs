//! Validator registry: who may confirm transfers.

use std::collections::BTreeSet;

use cosign_core::Principal;

use crate::EngineError;

/// Set of principals authorized to confirm transfers.
///
/// The owner is a validator without ever being stored as a member.
#[derive(Debug, Clone)]
pub struct ValidatorRegistry {
    owner: Principal,
    members: BTreeSet<Principal>,
    order: Vec<Principal>,
}

impl ValidatorRegistry {
    /// Create a registry owned by `owner`.
    #[must_use]
    pub fn new(owner: Principal) -> Self {
        Self { owner, members: BTreeSet::new(), order: Vec::new() }
    }

    /// The fixed owner principal.
    #[must_use]
    pub fn owner(&self) -> Principal {
        self.owner
    }

    /// Register `principal` as a validator.
    ///
    /// # Errors
    /// Returns [`EngineError::Unauthorized`] if `caller` is not the owner,
    /// [`EngineError::InvalidPrincipal`] for the null principal, and
    /// [`EngineError::AlreadyMember`] if `principal` is already a validator.
    pub fn add_validator(
        &mut self,
        caller: Principal,
        principal: Principal,
    ) -> Result<(), EngineError> {
        self.check_add(caller, principal)?;
        self.members.insert(principal);
        self.order.push(principal);
        Ok(())
    }

    /// Validate an add without writing anything.
    ///
    /// # Errors
    /// Same as [`ValidatorRegistry::add_validator`].
    pub fn check_add(&self, caller: Principal, principal: Principal) -> Result<(), EngineError> {
        if caller != self.owner {
            return Err(EngineError::Unauthorized { caller });
        }
        if principal.is_zero() {
            return Err(EngineError::InvalidPrincipal);
        }
        if self.is_validator(&principal) {
            return Err(EngineError::AlreadyMember(principal));
        }
        Ok(())
    }

    /// Returns `true` iff `principal` is the owner or an added member.
    #[must_use]
    pub fn is_validator(&self, principal: &Principal) -> bool {
        !principal.is_zero() && (*principal == self.owner || self.members.contains(principal))
    }

    /// Explicitly added validators, in insertion order. Excludes the owner.
    #[must_use]
    pub fn members(&self) -> &[Principal] {
        &self.order
    }
}
