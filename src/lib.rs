#![allow(clippy::doc_markdown)] // Allow technical terms like TestClass.method in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # TxTest Core
//!
//! Transactional test execution: wraps a single test method invocation in an
//! optional transaction and runs user hooks at well-defined points around it.
//!
//! ## Overview
//!
//! A test runner calls [`TransactionLifecycleController::before_test`] before
//! a test body and [`TransactionLifecycleController::after_test`] after it.
//! Between the two, the controller decides whether the method is
//! transactional, resolves the transaction manager, computes the rollback
//! flag, runs before/after-transaction hooks and keeps at most one live
//! transaction per executing thread.
//!
//! ## Architecture
//!
//! Everything the controller needs from the outside world is an explicit
//! collaborator trait:
//!
//! - [`metadata::MetadataSource`] answers "what did this test declare?"
//! - [`registry::ManagerContainer`] supplies transaction managers
//! - [`transaction::TransactionManager`] begins and ends transactions
//! - [`hooks::TestInstance`] invokes hook methods on the live test object
//!
//! ## Key Features
//!
//! - **Hook discovery with shadowing**: subclass hooks hide identical ancestor hooks
//! - **Asymmetric failure handling**: fail-fast before-hooks, best-effort after-hooks
//! - **Thread-keyed context holder**: injected, so concurrency is testable
//! - **Strict or lenient manager resolution**: configurable, lenient by default
//! - **Phase-aware errors**: setup failures are distinguishable from teardown failures
//!
//! ## Module Organization
//!
//! - [`lifecycle`] - Before/after-test controller and per-invocation context
//! - [`transaction`] - Attributes, rollback policy, contexts and the holder
//! - [`hooks`] - Hook discovery and execution
//! - [`metadata`] - Test class model and metadata lookups
//! - [`registry`] - Transaction manager container
//! - [`state_machine`] - Per-thread lifecycle states
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup and helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use txtest_core::hooks::FnTestInstance;
//! use txtest_core::metadata::{MethodDescriptor, TestClass};
//! use txtest_core::registry::{ManagerRegistration, ManagerRegistry};
//! use txtest_core::test_utils::InMemoryTransactionManager;
//! use txtest_core::transaction::TransactionAttribute;
//! use txtest_core::{TestContext, TransactionLifecycleController};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = Arc::new(InMemoryTransactionManager::new("transactionManager"));
//! let registry = ManagerRegistry::new();
//! registry.register(ManagerRegistration::new("transactionManager", manager.clone()))?;
//!
//! let class = Arc::new(
//!     TestClass::new("OrderRepositoryTests")
//!         .transactional(TransactionAttribute::required())
//!         .with_method(MethodDescriptor::new("savesOrder")),
//! );
//! let controller = TransactionLifecycleController::with_defaults(Arc::new(registry));
//! let test = TestContext::new(class, "savesOrder", Arc::new(FnTestInstance::new()))?;
//!
//! controller.before_test(&test)?;
//! // ... test body runs inside the transaction ...
//! controller.after_test(&test)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod hooks;
pub mod lifecycle;
pub mod logging;
pub mod metadata;
pub mod registry;
pub mod state_machine;
pub mod test_utils;
pub mod transaction;

pub use config::{ConfigurationError, ListenerConfig};
pub use error::{FailurePhase, Result, TxTestError};
pub use hooks::{HookMethod, HookRunner, TestInstance};
pub use lifecycle::{TestContext, TransactionLifecycleController};
pub use metadata::{MetadataSource, TestClass};
pub use registry::{ManagerContainer, ManagerRegistry};
pub use state_machine::{LifecycleState, LifecycleStateMachine};
pub use transaction::{
    ExecutionKey, TestTransaction, TransactionAttribute, TransactionContextHolder,
    TransactionManager,
};
