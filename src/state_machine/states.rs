use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-execution lifecycle state of the transactional test wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No transaction open and none being prepared
    #[default]
    Idle,
    /// Manager resolved, before-transaction hooks running, transaction not yet started
    TxPending,
    /// Transaction open and published for the running test body
    TxActive,
}

impl LifecycleState {
    /// Check if a transaction context is published in this state
    pub fn has_transaction(&self) -> bool {
        matches!(self, Self::TxActive)
    }

    /// Check if a new before-test phase may begin
    pub fn accepts_new_test(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::TxPending => write!(f, "tx_pending"),
            Self::TxActive => write!(f, "tx_active"),
        }
    }
}

impl std::str::FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "tx_pending" => Ok(Self::TxPending),
            "tx_active" => Ok(Self::TxActive),
            _ => Err(format!("Invalid lifecycle state: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(LifecycleState::Idle.accepts_new_test());
        assert!(!LifecycleState::TxPending.accepts_new_test());
        assert!(!LifecycleState::TxActive.accepts_new_test());
        assert!(LifecycleState::TxActive.has_transaction());
        assert!(!LifecycleState::TxPending.has_transaction());
    }

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(LifecycleState::TxPending.to_string(), "tx_pending");
        assert_eq!(
            "tx_active".parse::<LifecycleState>().unwrap(),
            LifecycleState::TxActive
        );
        assert!("running".parse::<LifecycleState>().is_err());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&LifecycleState::TxActive).unwrap();
        assert_eq!(json, "\"tx_active\"");
        let parsed: LifecycleState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, LifecycleState::TxActive);
    }
}
