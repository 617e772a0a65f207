//! Forwards engine notifications to the process log.

use cosign_core::EngineEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Log every event from `events` until the engine is dropped.
///
/// Returns the number of events logged.
pub async fn log_events(mut events: broadcast::Receiver<EngineEvent>) -> u64 {
    let mut logged = 0u64;
    loop {
        match events.recv().await {
            Ok(event) => {
                logged += 1;
                tracing::info!(?event, "engine event");
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event logger lagged; notifications dropped");
            }
            Err(RecvError::Closed) => return logged,
        }
    }
}

/// Spawn [`log_events`] on the current runtime.
#[must_use]
pub fn spawn_event_logger(events: broadcast::Receiver<EngineEvent>) -> JoinHandle<u64> {
    tokio::spawn(log_events(events))
}

#[cfg(test)]
mod tests {
    use cosign_core::{Amount, Principal};
    use cosign_engine::{AuthorizationEngine, EngineConfig};

    use super::*;

    #[tokio::test]
    async fn logger_drains_until_engine_dropped() {
        let owner = Principal::new([0xaa; 20]);
        let mut engine = AuthorizationEngine::new(&EngineConfig::new(owner));
        let handle = spawn_event_logger(engine.subscribe());

        assert!(engine.add_validator(owner, Principal::new([2u8; 20])).is_ok());
        assert!(engine
            .initiate_transfer(Principal::new([4u8; 20]), owner, Amount::new(1), Amount::new(1))
            .is_ok());
        drop(engine);

        let logged = match handle.await {
            Ok(n) => n,
            Err(e) => panic!("logger task failed: {e}"),
        };
        assert_eq!(logged, 2);
    }
}
