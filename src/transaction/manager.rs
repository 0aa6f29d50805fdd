//! # Transaction Manager Boundary
//!
//! The contract the lifecycle needs from a transactional resource: begin a
//! transaction for an attribute, end it once (commit or roll back), and report
//! whether a handle is already completed.

use super::attribute::TransactionAttribute;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Failures raised by a transaction manager
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("Transaction {id} is already completed")]
    AlreadyCompleted { id: Uuid },

    #[error("Transaction {id} is not known to this manager")]
    UnknownTransaction { id: Uuid },

    #[error("Could not begin transaction: {reason}")]
    Begin { reason: String },

    #[error("Commit of transaction {id} failed: {reason}")]
    Commit { id: Uuid, reason: String },

    #[error("Rollback of transaction {id} failed: {reason}")]
    Rollback { id: Uuid, reason: String },
}

/// Handle for one transaction returned by [`TransactionManager::begin`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus {
    id: Uuid,
    name: Option<String>,
    read_only: bool,
    started_at: DateTime<Utc>,
}

impl TransactionStatus {
    /// A fresh handle for a transaction opened with `attribute`
    pub fn new(attribute: &TransactionAttribute) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: attribute.name.clone(),
            read_only: attribute.read_only,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// A transactional resource manager.
///
/// Implementations are shared between test threads and must be safe for
/// concurrent use; the lifecycle does not serialize access.
pub trait TransactionManager: Send + Sync + fmt::Debug {
    /// Identifier used in diagnostics
    fn name(&self) -> &str;

    fn begin(&self, attribute: &TransactionAttribute) -> Result<TransactionStatus, TransactionError>;

    /// Commit (`rollback == false`) or roll back. Calling it twice for one
    /// handle is a programming error and fails with `AlreadyCompleted`.
    fn end(&self, status: &TransactionStatus, rollback: bool) -> Result<(), TransactionError>;

    fn is_completed(&self, status: &TransactionStatus) -> bool;
}
