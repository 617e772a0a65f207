//! Quorum-gated escrow engine.
//!
//! Holds deposited value in escrow and releases it to the named recipient
//! once two independent validators, neither of them sender nor recipient,
//! have confirmed the transfer.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod engine;
pub mod error;
pub mod escrow;
pub mod ledger;
pub mod registry;
pub mod shared;

pub use config::EngineConfig;
pub use engine::{AuthorizationEngine, Confirmation, EngineSnapshot};
pub use error::{EngineError, Participant};
pub use escrow::EscrowAccount;
pub use ledger::TransactionLedger;
pub use registry::ValidatorRegistry;
pub use shared::SharedEngine;
