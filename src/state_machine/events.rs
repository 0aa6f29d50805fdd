use serde::{Deserialize, Serialize};

/// Events that drive lifecycle state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LifecycleEvent {
    /// A transaction manager resolved for a transactional test
    TransactionRequested,
    /// Before-transaction hooks passed and the transaction is open
    TransactionStarted,
    /// A before-transaction hook or the transaction start failed
    SetupAborted(String),
    /// The after-test phase took the context and tore it down
    TestFinished,
}

impl LifecycleEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TransactionRequested => "transaction_requested",
            Self::TransactionStarted => "transaction_started",
            Self::SetupAborted(_) => "setup_aborted",
            Self::TestFinished => "test_finished",
        }
    }

    /// Extract the failure reason if this is an abort event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::SetupAborted(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::SetupAborted(reason.into())
    }
}
