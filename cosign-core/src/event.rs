use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::id::{Principal, TransferId};

/// Notification published after a state change has committed.
///
/// Delivery is fire-and-forget and at most once per triggering call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum EngineEvent {
    /// The owner registered a new validator.
    ValidatorAdded { validator: Principal },
    /// A deposit opened a new pending transfer.
    TransactionCreated {
        sender: Principal,
        recipient: Principal,
        amount: Amount,
        id: TransferId,
    },
    /// A validator confirmed a pending transfer.
    TransactionConfirmed {
        id: TransferId,
        validator: Principal,
        confirmations: u32,
    },
    /// Quorum was reached and the escrowed amount released.
    TransactionExecuted {
        id: TransferId,
        recipient: Principal,
        amount: Amount,
    },
}
