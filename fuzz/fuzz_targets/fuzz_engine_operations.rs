//! Fuzz target: arbitrary operation sequences against one engine.
//!
//! Each 4-byte chunk decodes to one call. After every call the full
//! snapshot must pass the audit.

#![no_main]

use cosign_auditor::audit;
use cosign_core::{Amount, Principal, TransferId};
use cosign_engine::{AuthorizationEngine, EngineConfig};
use libfuzzer_sys::fuzz_target;

fn principal(byte: u8) -> Principal {
    Principal::new([byte % 8; 20])
}

fuzz_target!(|data: &[u8]| {
    let mut engine = AuthorizationEngine::new(&EngineConfig::new(principal(1)));

    for chunk in data.chunks_exact(4) {
        let (op, a, b, c) = (chunk[0] % 3, chunk[1], chunk[2], chunk[3]);
        let _ = match op {
            0 => engine.add_validator(principal(a), principal(b)).map(|_| ()),
            1 => engine
                .initiate_transfer(
                    principal(a),
                    principal(b),
                    Amount::new(u128::from(c)),
                    Amount::new(u128::from(c)),
                )
                .map(|_| ()),
            _ => engine.confirm(principal(a), TransferId::new(u64::from(b))).map(|_| ()),
        };

        if let Err(violation) = audit(&engine.snapshot()) {
            panic!("invariant broken: {violation}");
        }
    }
});
