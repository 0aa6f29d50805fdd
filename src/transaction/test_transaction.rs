//! # In-Test Transaction Control
//!
//! Lets code running inside a test body inspect and steer the transaction the
//! lifecycle opened for it: flag it for commit or rollback, end it early, and
//! open a fresh one in the same context.
//!
//! ```rust
//! use txtest_core::transaction::{ExecutionKey, TestTransaction, TransactionContextHolder};
//!
//! let holder = TransactionContextHolder::new();
//! let tx = TestTransaction::new(&holder, ExecutionKey::named("worker-1"));
//! assert!(!tx.is_active());
//! assert!(tx.flag_for_commit().is_err());
//! ```

use super::context::TransactionContext;
use super::holder::{ExecutionKey, TransactionContextHolder};
use crate::error::{Result, TxTestError};

/// Handle on the transaction published for one execution key
#[derive(Debug)]
pub struct TestTransaction<'a> {
    holder: &'a TransactionContextHolder,
    key: ExecutionKey,
}

impl<'a> TestTransaction<'a> {
    pub fn new(holder: &'a TransactionContextHolder, key: ExecutionKey) -> Self {
        Self { holder, key }
    }

    /// Transaction control for the calling thread
    pub fn for_current_thread(holder: &'a TransactionContextHolder) -> Self {
        Self::new(holder, ExecutionKey::current())
    }

    /// Whether a transaction is currently open; `false` without a context
    pub fn is_active(&self) -> bool {
        self.holder
            .with_current(&self.key, |context| context.is_active())
            .unwrap_or(false)
    }

    pub fn is_flagged_for_rollback(&self) -> Result<bool> {
        self.with_context(|context| Ok(context.is_flagged_for_rollback()))
    }

    pub fn flag_for_rollback(&self) -> Result<()> {
        self.set_flag(true)
    }

    pub fn flag_for_commit(&self) -> Result<()> {
        self.set_flag(false)
    }

    /// End the open transaction now, honoring the current rollback flag
    pub fn end(&self) -> Result<()> {
        self.with_context(TransactionContext::end_transaction)
    }

    /// Open a fresh transaction after [`TestTransaction::end`]
    pub fn start(&self) -> Result<()> {
        self.with_context(TransactionContext::start_transaction)
    }

    fn set_flag(&self, rollback: bool) -> Result<()> {
        self.with_context(|context| {
            if !context.is_active() {
                return Err(TxTestError::illegal_state(
                    "The transaction flag cannot be changed: no transaction is active",
                ));
            }
            context.set_flagged_for_rollback(rollback);
            Ok(())
        })
    }

    fn with_context<R>(
        &self,
        f: impl FnOnce(&mut TransactionContext) -> Result<R>,
    ) -> Result<R> {
        self.holder.with_current(&self.key, f).unwrap_or_else(|| {
            Err(TxTestError::illegal_state(format!(
                "No transaction is managed by the test lifecycle for {}",
                self.key
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{InMemoryTransactionManager, ManagerEvent};
    use crate::transaction::TransactionAttribute;
    use std::sync::Arc;

    fn published(holder: &TransactionContextHolder, manager: &Arc<InMemoryTransactionManager>) -> ExecutionKey {
        let key = ExecutionKey::named("worker-1");
        let mut context = TransactionContext::new(
            "Suite.case",
            manager.clone(),
            TransactionAttribute::required().named("Suite.case"),
            true,
        );
        context.start_transaction().unwrap();
        holder.publish(key.clone(), context).unwrap();
        key
    }

    #[test]
    fn test_flag_for_commit_then_end_commits() {
        let holder = TransactionContextHolder::new();
        let manager = Arc::new(InMemoryTransactionManager::new("tx"));
        let tx = TestTransaction::new(&holder, published(&holder, &manager));

        assert!(tx.is_active());
        assert!(tx.is_flagged_for_rollback().unwrap());
        tx.flag_for_commit().unwrap();
        assert!(!tx.is_flagged_for_rollback().unwrap());

        tx.end().unwrap();
        assert!(!tx.is_active());
        assert_eq!(
            manager.events().last(),
            Some(&ManagerEvent::Committed(Some("Suite.case".to_string())))
        );
    }

    #[test]
    fn test_restart_after_end() {
        let holder = TransactionContextHolder::new();
        let manager = Arc::new(InMemoryTransactionManager::new("tx"));
        let key = published(&holder, &manager);
        let tx = TestTransaction::new(&holder, key.clone());

        tx.end().unwrap();
        assert!(tx.flag_for_rollback().is_err());
        tx.start().unwrap();
        assert!(tx.is_active());
        assert_eq!(
            holder.with_current(&key, |c| c.transactions_started()),
            Some(2)
        );
    }

    #[test]
    fn test_operations_without_context_fail() {
        let holder = TransactionContextHolder::new();
        let tx = TestTransaction::new(&holder, ExecutionKey::named("nobody"));
        assert!(!tx.is_active());
        assert!(tx.is_flagged_for_rollback().is_err());
        assert!(tx.end().is_err());
        assert!(tx.start().is_err());
    }
}
