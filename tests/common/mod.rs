//! Shared fixtures for integration tests

#![allow(dead_code)]

pub mod strategies;

use std::sync::Arc;
use txtest_core::config::ListenerConfig;
use txtest_core::hooks::FnTestInstance;
use txtest_core::metadata::{DeclaredMetadataSource, TestClass};
use txtest_core::registry::{ManagerRegistration, ManagerRegistry};
use txtest_core::test_utils::InMemoryTransactionManager;
use txtest_core::transaction::{ExecutionKey, TransactionContextHolder};
use txtest_core::{TestContext, TransactionLifecycleController};

/// A registry holding one manager under the conventional name
pub fn single_manager_registry() -> (Arc<InMemoryTransactionManager>, Arc<ManagerRegistry>) {
    let manager = Arc::new(InMemoryTransactionManager::new("transactionManager"));
    let registry = ManagerRegistry::new();
    registry
        .register(ManagerRegistration::new("transactionManager", manager.clone()))
        .expect("registering the first manager succeeds");
    (manager, Arc::new(registry))
}

/// Controller with a shared holder so tests can inspect published contexts
pub fn controller(
    registry: Arc<ManagerRegistry>,
    config: ListenerConfig,
) -> (TransactionLifecycleController, Arc<TransactionContextHolder>) {
    txtest_core::logging::init_structured_logging();
    let holder = Arc::new(TransactionContextHolder::new());
    let controller = TransactionLifecycleController::new(
        Arc::new(DeclaredMetadataSource),
        registry,
        Arc::clone(&holder),
        config,
    );
    (controller, holder)
}

pub fn test_context(
    class: &Arc<TestClass>,
    method: &str,
    instance: FnTestInstance,
    worker: &str,
) -> TestContext {
    TestContext::new(Arc::clone(class), method, Arc::new(instance))
        .expect("test method is declared")
        .with_execution_key(ExecutionKey::named(worker))
}
