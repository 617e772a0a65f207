//! Core types for the cosign quorum-gated escrow engine.
//!
//! Defines the principals that deposit, receive and approve value, the
//! transfer request record, amounts, and the notifications the engine
//! publishes.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod amount;
pub mod error;
pub mod event;
pub mod id;
pub mod transfer;

pub use amount::{Amount, QUORUM};
pub use error::CoreError;
pub use event::EngineEvent;
pub use id::{Principal, TransferId, PRINCIPAL_LEN};
pub use transfer::{TransferRequest, TransferSummary};

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(byte: u8) -> Principal {
        Principal::new([byte; PRINCIPAL_LEN])
    }

    #[test]
    fn principal_display_shows_prefixed_hex() {
        let mut bytes = [0u8; PRINCIPAL_LEN];
        bytes[0] = 0xde;
        bytes[1] = 0xad;
        bytes[19] = 0xff;
        let s = Principal::new(bytes).to_string();
        assert!(s.starts_with("0xdead"), "expected hex starting with '0xdead', got {s}");
        assert!(s.ends_with("ff"), "expected hex ending with 'ff', got {s}");
        assert_eq!(s.len(), 42, "principal text must be 0x + 40 hex chars");
    }

    #[test]
    fn principal_parse_accepts_prefixed_and_bare_hex() {
        let expected = principal(0xab);
        let prefixed: Principal = match "0xabababababababababababababababababababab".parse() {
            Ok(p) => p,
            Err(e) => panic!("unexpected error: {e}"),
        };
        let bare: Principal = match "ABABABABABABABABABABABABABABABABABABABAB".parse() {
            Ok(p) => p,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(prefixed, expected);
        assert_eq!(bare, expected);
    }

    #[test]
    fn principal_parse_rejects_bad_input() {
        assert!("0x1234".parse::<Principal>().is_err(), "short input must fail");
        assert!(
            "0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz".parse::<Principal>().is_err(),
            "non-hex input must fail"
        );
        assert!("".parse::<Principal>().is_err(), "empty input must fail");
    }

    #[test]
    fn zero_principal_is_null() {
        assert!(Principal::ZERO.is_zero());
        assert!(!principal(1).is_zero());
        let parsed: Principal = match "0x0000000000000000000000000000000000000000".parse() {
            Ok(p) => p,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(parsed, Principal::ZERO);
    }

    #[test]
    fn principal_serializes_as_hex_string() {
        let p = principal(0x01);
        let json = match serde_json::to_string(&p) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(json, "\"0x0101010101010101010101010101010101010101\"");
        let back: Principal = match serde_json::from_str(&json) {
            Ok(p) => p,
            Err(e) => panic!("deserialization failed: {e}"),
        };
        assert_eq!(back, p);
    }

    #[test]
    fn transfer_id_next_increments() {
        let id = TransferId::new(0);
        assert_eq!(id.next(), TransferId::new(1));
        assert_eq!(id.next().next().value(), 2);
        assert_eq!(TransferId::new(7).to_string(), "7");
    }

    #[test]
    fn amount_checked_arithmetic() {
        let one = Amount::new(1);
        assert_eq!(one.checked_add(one), Ok(Amount::new(2)));
        assert_eq!(Amount::new(3).checked_sub(one), Ok(Amount::new(2)));
        assert_eq!(
            Amount::ZERO.checked_sub(one),
            Err(CoreError::AmountUnderflow { lhs: 0, rhs: 1 })
        );
        assert!(matches!(
            Amount::new(u128::MAX).checked_add(one),
            Err(CoreError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn transfer_request_new_starts_pending() {
        let req = TransferRequest::new(TransferId::new(0), principal(4), principal(5), Amount::new(10));
        assert!(req.is_pending());
        assert!(!req.executed);
        assert_eq!(req.confirmations, 0);
        assert!(req.confirmed_by.is_empty());
        assert!(req.executed_at.is_none(), "executed_at must default to None");
        assert_eq!(req.remaining_confirmations(), QUORUM);
    }

    #[test]
    fn transfer_request_participants() {
        let req = TransferRequest::new(TransferId::new(0), principal(4), principal(5), Amount::new(1));
        assert!(req.is_participant(&principal(4)), "sender is a participant");
        assert!(req.is_participant(&principal(5)), "recipient is a participant");
        assert!(!req.is_participant(&principal(6)));
    }

    #[test]
    fn transfer_summary_mirrors_request() {
        let mut req =
            TransferRequest::new(TransferId::new(3), principal(4), principal(5), Amount::new(9));
        req.confirmations = 1;
        req.confirmed_by.insert(principal(1));
        let summary = req.summary();
        assert_eq!(summary.id, TransferId::new(3));
        assert_eq!(summary.sender, principal(4));
        assert_eq!(summary.recipient, principal(5));
        assert_eq!(summary.amount, Amount::new(9));
        assert_eq!(summary.confirmations, 1);
        assert!(!summary.executed);
    }

    #[test]
    fn engine_event_serializes_with_tag() {
        let event = EngineEvent::ValidatorAdded { validator: principal(2) };
        let json = match serde_json::to_string(&event) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert!(json.contains("\"event\":\"validator_added\""), "missing tag in {json}");
        assert!(json.contains("0x0202"), "missing validator in {json}");
    }
}
