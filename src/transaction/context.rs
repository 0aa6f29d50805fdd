//! # Transaction Context
//!
//! Live transaction state for one transactional test invocation. Created in
//! the before-test phase, owned by the executing test thread, discarded after
//! the after-test phase.

use super::attribute::TransactionAttribute;
use super::manager::{TransactionManager, TransactionStatus};
use crate::constants::events;
use crate::error::{Result, TxTestError};
use crate::logging::log_transaction_operation;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct TransactionContext {
    test_name: String,
    manager: Arc<dyn TransactionManager>,
    attribute: TransactionAttribute,
    flagged_for_rollback: bool,
    status: Option<TransactionStatus>,
    transactions_started: u32,
}

impl TransactionContext {
    pub fn new(
        test_name: impl Into<String>,
        manager: Arc<dyn TransactionManager>,
        attribute: TransactionAttribute,
        default_rollback: bool,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            manager,
            attribute,
            flagged_for_rollback: default_rollback,
            status: None,
            transactions_started: 0,
        }
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub fn manager(&self) -> &Arc<dyn TransactionManager> {
        &self.manager
    }

    pub fn attribute(&self) -> &TransactionAttribute {
        &self.attribute
    }

    pub fn transaction_status(&self) -> Option<&TransactionStatus> {
        self.status.as_ref()
    }

    pub fn is_flagged_for_rollback(&self) -> bool {
        self.flagged_for_rollback
    }

    pub fn set_flagged_for_rollback(&mut self, rollback: bool) {
        self.flagged_for_rollback = rollback;
    }

    /// How many transactions this context has opened (more than one after an
    /// in-test end/start cycle)
    pub fn transactions_started(&self) -> u32 {
        self.transactions_started
    }

    /// A transaction handle exists and the manager has not completed it
    pub fn is_active(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| !self.manager.is_completed(status))
    }

    /// Open a transaction with the stored attribute
    pub fn start_transaction(&mut self) -> Result<()> {
        if self.status.is_some() {
            return Err(TxTestError::illegal_state(
                "Cannot start a new transaction without ending the existing transaction first.",
            ));
        }

        let status = self
            .manager
            .begin(&self.attribute)
            .map_err(|source| TxTestError::TransactionStart {
                test: self.test_name.clone(),
                source,
            })?;

        self.transactions_started += 1;
        log_transaction_operation(
            events::TRANSACTION_STARTED,
            &self.test_name,
            Some(self.manager.name()),
            Some(self.flagged_for_rollback),
            Some(&status.to_string()),
        );
        self.status = Some(status);
        Ok(())
    }

    /// Commit or roll back according to the rollback flag.
    ///
    /// The handle is released even when the manager fails to end it.
    pub fn end_transaction(&mut self) -> Result<()> {
        let status = self.status.take().ok_or_else(|| {
            TxTestError::illegal_state(
                "Failed to end transaction: no transaction is associated with this context",
            )
        })?;

        debug!(
            "Ending transaction {} for test {} with rollback = {}",
            status, self.test_name, self.flagged_for_rollback
        );

        self.manager
            .end(&status, self.flagged_for_rollback)
            .map_err(|source| TxTestError::TransactionEnd {
                test: self.test_name.clone(),
                source,
            })?;

        let operation = if self.flagged_for_rollback {
            events::TRANSACTION_ROLLED_BACK
        } else {
            events::TRANSACTION_COMMITTED
        };
        log_transaction_operation(
            operation,
            &self.test_name,
            Some(self.manager.name()),
            Some(self.flagged_for_rollback),
            Some(&status.to_string()),
        );
        Ok(())
    }
}
