//! # Registry Infrastructure
//!
//! The container boundary that supplies transaction managers to the lifecycle.
//!
//! ## Overview
//!
//! The lifecycle never constructs transaction managers. It asks a
//! [`ManagerContainer`] either for the manager carrying a specific qualifier, or
//! for a manager by configured name (empty name meaning "the unique or primary
//! one"). [`ManagerRegistry`] is the in-process container shipped with the crate.
//!
//! ## Usage
//!
//! ```rust
//! use txtest_core::registry::{ManagerContainer, ManagerRegistration, ManagerRegistry};
//! use txtest_core::test_utils::InMemoryTransactionManager;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ManagerRegistry::new();
//! registry.register(
//!     ManagerRegistration::new("auditTx", Arc::new(InMemoryTransactionManager::new("auditTx")))
//!         .with_qualifier("audit"),
//! )?;
//!
//! let manager = registry.lookup_by_qualifier("audit")?;
//! assert_eq!(manager.name(), "auditTx");
//! # Ok(())
//! # }
//! ```

pub mod manager_registry;

use crate::transaction::TransactionManager;
use std::sync::Arc;
use thiserror::Error;

pub use manager_registry::{ManagerRegistration, ManagerRegistry, ManagerSelector};

/// Container lookup failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("No transaction manager named or qualified '{0}'")]
    NoSuchManager(String),

    #[error("Expected a single transaction manager for '{key}' but found {candidates:?}")]
    NoUniqueManager { key: String, candidates: Vec<String> },

    #[error("Container misconfigured: {0}")]
    Misconfigured(String),
}

/// Source of transaction manager instances
pub trait ManagerContainer: Send + Sync {
    /// The single manager whose name or qualifier matches `qualifier`
    fn lookup_by_qualifier(
        &self,
        qualifier: &str,
    ) -> Result<Arc<dyn TransactionManager>, LookupError>;

    /// The manager registered as `name`; with an empty name, the unique,
    /// selected or primary manager. `Ok(None)` when nothing is registered.
    fn lookup_by_name_or_primary(
        &self,
        name: &str,
    ) -> Result<Option<Arc<dyn TransactionManager>>, LookupError>;
}
