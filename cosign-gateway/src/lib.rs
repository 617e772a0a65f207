//! HTTP API gateway for the cosign quorum-gated escrow engine.
//!
//! Exposes validator registration, deposits, confirmations and read
//! accessors of one shared engine to a host process over JSON.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod notify;
pub mod routes;
