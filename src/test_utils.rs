//! # Test Utilities
//!
//! Reusable doubles for exercising the transaction lifecycle without a real
//! database: an in-memory transaction manager with a staged key-value resource,
//! and an invocation log for asserting hook order.

use crate::transaction::{TransactionAttribute, TransactionError, TransactionManager, TransactionStatus};
use crate::constants::system;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::Arc;
use uuid::Uuid;

/// Setup test environment variables if they are not already present
pub fn setup_test_environment() {
    if env::var(system::ENV_VARIABLE).is_err() {
        env::set_var(system::ENV_VARIABLE, "test");
    }
}

/// What an [`InMemoryTransactionManager`] was asked to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    Began { name: Option<String>, read_only: bool },
    Committed(Option<String>),
    RolledBack(Option<String>),
}

#[derive(Debug, Default)]
struct OpenTransaction {
    name: Option<String>,
    staged: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct ManagerState {
    open: HashMap<Uuid, OpenTransaction>,
    completed: HashSet<Uuid>,
    committed: HashMap<String, String>,
    events: Vec<ManagerEvent>,
    fail_next_begin: Option<String>,
    fail_next_end: Option<String>,
}

/// Transaction manager over an in-memory key-value store.
///
/// Writes made through [`InMemoryTransactionManager::write`] are staged on the
/// transaction and only become visible through
/// [`InMemoryTransactionManager::committed_value`] once it commits.
#[derive(Debug)]
pub struct InMemoryTransactionManager {
    name: String,
    state: Mutex<ManagerState>,
}

impl InMemoryTransactionManager {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(ManagerState::default()),
        }
    }

    pub fn events(&self) -> Vec<ManagerEvent> {
        self.state.lock().events.clone()
    }

    /// Make the next `begin` fail with `reason`
    pub fn fail_next_begin(&self, reason: impl Into<String>) {
        self.state.lock().fail_next_begin = Some(reason.into());
    }

    /// Make the next `end` fail with `reason`; the handle is still released
    pub fn fail_next_end(&self, reason: impl Into<String>) {
        self.state.lock().fail_next_end = Some(reason.into());
    }

    /// Stage a write inside the open transaction
    pub fn write(
        &self,
        status: &TransactionStatus,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TransactionError> {
        let mut state = self.state.lock();
        if state.completed.contains(&status.id()) {
            return Err(TransactionError::AlreadyCompleted { id: status.id() });
        }
        let open = state
            .open
            .get_mut(&status.id())
            .ok_or(TransactionError::UnknownTransaction { id: status.id() })?;
        open.staged.push((key.into(), value.into()));
        Ok(())
    }

    pub fn committed_value(&self, key: &str) -> Option<String> {
        self.state.lock().committed.get(key).cloned()
    }

    pub fn open_transactions(&self) -> usize {
        self.state.lock().open.len()
    }
}

impl TransactionManager for InMemoryTransactionManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&self, attribute: &TransactionAttribute) -> Result<TransactionStatus, TransactionError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.fail_next_begin.take() {
            return Err(TransactionError::Begin { reason });
        }

        let status = TransactionStatus::new(attribute);
        state.open.insert(
            status.id(),
            OpenTransaction {
                name: attribute.name.clone(),
                staged: Vec::new(),
            },
        );
        state.events.push(ManagerEvent::Began {
            name: attribute.name.clone(),
            read_only: attribute.read_only,
        });
        Ok(status)
    }

    fn end(&self, status: &TransactionStatus, rollback: bool) -> Result<(), TransactionError> {
        let mut state = self.state.lock();
        let id = status.id();
        if state.completed.contains(&id) {
            return Err(TransactionError::AlreadyCompleted { id });
        }
        let transaction = state
            .open
            .remove(&id)
            .ok_or(TransactionError::UnknownTransaction { id })?;
        state.completed.insert(id);

        if let Some(reason) = state.fail_next_end.take() {
            return Err(if rollback {
                TransactionError::Rollback { id, reason }
            } else {
                TransactionError::Commit { id, reason }
            });
        }

        if rollback {
            state.events.push(ManagerEvent::RolledBack(transaction.name));
        } else {
            state.committed.extend(transaction.staged);
            state.events.push(ManagerEvent::Committed(transaction.name));
        }
        Ok(())
    }

    fn is_completed(&self, status: &TransactionStatus) -> bool {
        self.state.lock().completed.contains(&status.id())
    }
}

/// Shared, ordered record of hook invocations
#[derive(Debug, Clone, Default)]
pub struct InvocationLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl InvocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Hook body that records `entry` and succeeds
    pub fn recording_hook(
        &self,
        entry: impl Into<String>,
    ) -> impl Fn() -> anyhow::Result<()> + Send + Sync + 'static {
        let log = self.clone();
        let entry = entry.into();
        move || {
            log.record(entry.clone());
            Ok(())
        }
    }

    /// Hook body that always fails with `message`
    pub fn failing_hook(
        message: impl Into<String>,
    ) -> impl Fn() -> anyhow::Result<()> + Send + Sync + 'static {
        let message = message.into();
        move || Err(anyhow::anyhow!(message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_publishes_staged_writes() {
        let manager = InMemoryTransactionManager::new("tx");
        let status = manager
            .begin(&TransactionAttribute::required().named("Suite.case"))
            .unwrap();
        manager.write(&status, "order:1", "placed").unwrap();
        assert_eq!(manager.committed_value("order:1"), None);

        manager.end(&status, false).unwrap();
        assert_eq!(manager.committed_value("order:1").as_deref(), Some("placed"));
        assert!(manager.is_completed(&status));
    }

    #[test]
    fn test_rollback_discards_staged_writes() {
        let manager = InMemoryTransactionManager::new("tx");
        let status = manager.begin(&TransactionAttribute::required()).unwrap();
        manager.write(&status, "order:1", "placed").unwrap();
        manager.end(&status, true).unwrap();

        assert_eq!(manager.committed_value("order:1"), None);
        assert_eq!(manager.events().last(), Some(&ManagerEvent::RolledBack(None)));
        assert_eq!(manager.open_transactions(), 0);
    }

    #[test]
    fn test_second_end_is_rejected() {
        let manager = InMemoryTransactionManager::new("tx");
        let status = manager.begin(&TransactionAttribute::required()).unwrap();
        manager.end(&status, true).unwrap();
        assert_eq!(
            manager.end(&status, true),
            Err(TransactionError::AlreadyCompleted { id: status.id() })
        );
        assert!(manager.write(&status, "k", "v").is_err());
    }

    #[test]
    fn test_injected_failures_fire_once() {
        let manager = InMemoryTransactionManager::new("tx");
        manager.fail_next_begin("pool exhausted");
        assert!(matches!(
            manager.begin(&TransactionAttribute::required()),
            Err(TransactionError::Begin { .. })
        ));

        let status = manager.begin(&TransactionAttribute::required()).unwrap();
        manager.fail_next_end("connection reset");
        assert!(matches!(
            manager.end(&status, false),
            Err(TransactionError::Commit { .. })
        ));
        assert!(manager.is_completed(&status));
    }

    #[test]
    fn test_invocation_log_helpers() {
        let log = InvocationLog::new();
        (log.recording_hook("first"))().unwrap();
        assert_eq!(log.entries(), vec!["first"]);
        assert_eq!(
            (InvocationLog::failing_hook("boom"))().unwrap_err().to_string(),
            "boom"
        );
    }

    #[test]
    fn test_setup_environment_is_idempotent() {
        setup_test_environment();
        setup_test_environment();
        assert!(env::var(system::ENV_VARIABLE).is_ok());
    }
}
