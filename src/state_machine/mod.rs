// Lifecycle state machine for the transactional test wrapper
//
// One state per execution key: Idle -> TxPending -> TxActive -> Idle.
// Non-transactional tests never leave Idle.

pub mod events;
pub mod states;

pub use events::LifecycleEvent;
pub use states::LifecycleState;

use crate::error::{Result, TxTestError};

/// Pure transition table for [`LifecycleState`]
pub struct LifecycleStateMachine;

impl LifecycleStateMachine {
    /// Determine the target state based on current state and event
    pub fn determine_target_state(
        current_state: LifecycleState,
        event: &LifecycleEvent,
    ) -> Result<LifecycleState> {
        let target = match (current_state, event) {
            (LifecycleState::Idle, LifecycleEvent::TransactionRequested) => {
                LifecycleState::TxPending
            }
            (LifecycleState::TxPending, LifecycleEvent::TransactionStarted) => {
                LifecycleState::TxActive
            }
            (LifecycleState::TxPending, LifecycleEvent::SetupAborted(_)) => LifecycleState::Idle,
            // Context may already be gone when after-test runs without a transaction
            (LifecycleState::TxActive | LifecycleState::Idle, LifecycleEvent::TestFinished) => {
                LifecycleState::Idle
            }
            (from_state, _) => {
                return Err(TxTestError::illegal_state(format!(
                    "Invalid lifecycle transition from {from_state} on {}",
                    event.event_type()
                )))
            }
        };

        Ok(target)
    }
}
