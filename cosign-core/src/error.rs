/// Errors produced by the `cosign-core` crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A principal could not be parsed from its text form.
    #[error("invalid principal '{input}': {reason}")]
    InvalidPrincipal { input: String, reason: String },

    /// Adding two amounts overflowed.
    #[error("amount overflow: {lhs} + {rhs}")]
    AmountOverflow { lhs: u128, rhs: u128 },

    /// Subtracting two amounts went below zero.
    #[error("amount underflow: {lhs} - {rhs}")]
    AmountUnderflow { lhs: u128, rhs: u128 },
}
