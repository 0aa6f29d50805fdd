//! # Transaction Layer
//!
//! Everything between "a test declared transactional intent" and "a live
//! transaction handle": attribute resolution, rollback policy, class-level
//! configuration, manager lookup, the per-invocation [`TransactionContext`]
//! and the thread-keyed holder that publishes it to the running test.

pub mod attribute;
pub mod configuration;
pub mod context;
pub mod holder;
pub mod lookup;
pub mod manager;
pub mod rollback;
pub mod test_transaction;

pub use attribute::{Isolation, Propagation, TransactionAttribute, TransactionAttributeResolver};
pub use configuration::{ConfigurationAttributes, ConfigurationResolver};
pub use context::TransactionContext;
pub use holder::{ExecutionKey, TransactionContextHolder};
pub use lookup::TransactionManagerLookup;
pub use manager::{TransactionError, TransactionManager, TransactionStatus};
pub use rollback::RollbackPolicyResolver;
pub use test_transaction::TestTransaction;
