//! Fuzz target: `Principal` text parsing and display.
//!
//! Arbitrary strings must never panic the parser, and every accepted
//! principal must print back to a string that parses to itself.

#![no_main]

use cosign_core::Principal;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(principal) = data.parse::<Principal>() else {
        return;
    };

    let text = principal.to_string();
    assert_eq!(text.len(), 42, "Principal Display must produce 0x + 40 hex chars");
    let reparsed: Principal = text.parse().expect("displayed principal must parse");
    assert_eq!(reparsed, principal);
});
