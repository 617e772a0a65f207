//! Engine construction parameters.

use cosign_core::Principal;
use serde::{Deserialize, Serialize};

/// Default number of buffered notifications per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration for building an [`AuthorizationEngine`](crate::AuthorizationEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct EngineConfig {
    /// Deploying owner. Always a validator, never removable.
    pub owner: Principal,

    /// Buffered notifications per subscriber before the oldest are dropped.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl EngineConfig {
    /// Create a config for `owner` with the default event capacity.
    #[must_use]
    pub fn new(owner: Principal) -> Self {
        Self { owner, event_capacity: DEFAULT_EVENT_CAPACITY }
    }

    /// Override the per-subscriber event buffer. Zero is raised to one.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}
