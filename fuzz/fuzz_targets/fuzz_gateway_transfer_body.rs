//! Fuzz target: JSON deserialization of `InitiateTransferBody`.
//!
//! Verifies that arbitrary byte sequences fed to the JSON parser
//! never cause panics, UB, or unbounded resource consumption.

#![no_main]

use cosign_gateway::routes::InitiateTransferBody;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are expected and fine; only panics are failures.
    let _ = serde_json::from_slice::<InitiateTransferBody>(data);
});
