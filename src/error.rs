//! Error types for the transactional test lifecycle.
//!
//! Errors are grouped by the phase that produced them so a test runner can tell
//! a setup failure (the test body never ran) from a teardown failure (it did).

use crate::config::ConfigurationError;
use crate::registry::LookupError;
use crate::transaction::TransactionError;
use thiserror::Error;

/// Which part of the lifecycle produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePhase {
    /// Manager resolution or listener configuration; nothing ran yet
    Configuration,
    /// Before-transaction hooks or transaction start; the test body never ran
    Setup,
    /// Transaction end or after-transaction hooks; the test body did run
    Teardown,
    /// Programming error in how the lifecycle is driven
    Invariant,
}

#[derive(Debug, Error)]
pub enum TxTestError {
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Transaction manager lookup failed: {0}")]
    ManagerLookup(#[from] LookupError),

    #[error("No transaction manager could be resolved for {test}")]
    ManagerNotFound { test: String },

    #[error("Before-transaction hook {hook} failed: {source}")]
    BeforeHook {
        hook: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Hook {hook} could not be invoked: {reason}")]
    HookInvocation { hook: String, reason: String },

    #[error("Failed to start transaction for {test}: {source}")]
    TransactionStart {
        test: String,
        #[source]
        source: TransactionError,
    },

    #[error("Failed to end transaction for {test}: {source}")]
    TransactionEnd {
        test: String,
        #[source]
        source: TransactionError,
    },

    #[error("After-transaction hook {hook} failed: {source}")]
    AfterHook {
        hook: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl TxTestError {
    pub fn phase(&self) -> FailurePhase {
        match self {
            Self::IllegalState(_) => FailurePhase::Invariant,
            Self::ManagerLookup(_) | Self::ManagerNotFound { .. } | Self::Configuration(_) => {
                FailurePhase::Configuration
            }
            Self::BeforeHook { .. } | Self::TransactionStart { .. } => FailurePhase::Setup,
            Self::HookInvocation { .. } => FailurePhase::Setup,
            Self::TransactionEnd { .. } | Self::AfterHook { .. } => FailurePhase::Teardown,
        }
    }

    /// True when the failure happened before the test body could run
    pub fn is_setup_failure(&self) -> bool {
        !matches!(self.phase(), FailurePhase::Teardown)
    }

    /// Hand back the original hook failure, unwrapped from the phase category.
    ///
    /// Returns `None` for errors that did not originate in user hook code.
    pub fn into_cause(self) -> Option<anyhow::Error> {
        match self {
            Self::BeforeHook { source, .. } | Self::AfterHook { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TxTestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_classification() {
        let before = TxTestError::BeforeHook {
            hook: "Base::populate()".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(before.phase(), FailurePhase::Setup);
        assert!(before.is_setup_failure());

        let after = TxTestError::AfterHook {
            hook: "Base::verify()".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(after.phase(), FailurePhase::Teardown);
        assert!(!after.is_setup_failure());

        assert_eq!(
            TxTestError::illegal_state("nested").phase(),
            FailurePhase::Invariant
        );
    }

    #[test]
    fn test_into_cause_returns_original_failure() {
        let err = TxTestError::BeforeHook {
            hook: "Base::populate()".to_string(),
            source: anyhow::anyhow!("fixture missing"),
        };
        let cause = err.into_cause().unwrap();
        assert_eq!(cause.to_string(), "fixture missing");

        assert!(TxTestError::illegal_state("x").into_cause().is_none());
    }
}
