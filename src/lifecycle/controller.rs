//! # Transaction Lifecycle Controller
//!
//! Wraps one test method invocation in an optional transaction.
//!
//! ## Before the test
//!
//! 1. No context may already be live for the execution key.
//! 2. No transactional intent (or `NOT_SUPPORTED` propagation) means nothing
//!    happens, including hooks.
//! 3. The manager is resolved. A missing manager skips the transaction in
//!    lenient mode and fails in strict mode.
//! 4. Before-transaction hooks run (fail-fast), the rollback flag is
//!    computed, the transaction starts and the context is published.
//!
//! ## After the test
//!
//! The published context is always taken, so a later test never inherits it.
//! An open transaction is ended per its rollback flag, then every
//! after-transaction hook runs even if ending failed. A hook failure takes
//! priority over an end failure.

use super::test_context::TestContext;
use crate::config::ListenerConfig;
use crate::constants::events;
use crate::error::{Result, TxTestError};
use crate::hooks::HookRunner;
use crate::logging::{log_error, log_transaction_operation};
use crate::metadata::{DeclaredMetadataSource, MetadataSource, TestClass};
use crate::registry::ManagerContainer;
use crate::state_machine::{LifecycleEvent, LifecycleState, LifecycleStateMachine};
use crate::transaction::{
    ConfigurationAttributes, ConfigurationResolver, ExecutionKey, RollbackPolicyResolver,
    TransactionAttribute, TransactionAttributeResolver, TransactionContext,
    TransactionContextHolder, TransactionManager, TransactionManagerLookup,
};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct TransactionLifecycleController {
    metadata: Arc<dyn MetadataSource>,
    attributes: TransactionAttributeResolver,
    configuration: ConfigurationResolver,
    lookup: TransactionManagerLookup,
    hooks: HookRunner,
    holder: Arc<TransactionContextHolder>,
    states: DashMap<ExecutionKey, LifecycleState>,
    config: ListenerConfig,
}

impl TransactionLifecycleController {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        container: Arc<dyn ManagerContainer>,
        holder: Arc<TransactionContextHolder>,
        config: ListenerConfig,
    ) -> Self {
        info!(
            strict_manager_resolution = config.strict_manager_resolution,
            default_rollback = config.default_rollback,
            "Creating transaction lifecycle controller"
        );

        Self {
            attributes: TransactionAttributeResolver::new(Arc::clone(&metadata)),
            configuration: ConfigurationResolver::new(Arc::clone(&metadata), &config),
            lookup: TransactionManagerLookup::new(container, config.strict_manager_resolution),
            hooks: HookRunner::new(),
            holder,
            states: DashMap::new(),
            metadata,
            config,
        }
    }

    /// Controller reading declarations from the [`TestClass`] model, with a
    /// private holder and default configuration
    pub fn with_defaults(container: Arc<dyn ManagerContainer>) -> Self {
        Self::new(
            Arc::new(DeclaredMetadataSource),
            container,
            Arc::new(TransactionContextHolder::new()),
            ListenerConfig::default(),
        )
    }

    /// Open the transaction for `test`, if it is transactional
    pub fn before_test(&self, test: &TestContext) -> Result<()> {
        let key = test.execution_key();
        let test_name = test.test_name();
        debug!(operation = events::BEFORE_TEST, test = %test_name, key = %key, "Lifecycle phase");

        if self.holder.contains(key) || self.state(key) != LifecycleState::Idle {
            return Err(TxTestError::illegal_state(format!(
                "Cannot start a new transaction without ending the existing transaction first ({test})"
            )));
        }

        let Some(attribute) = self
            .attributes
            .resolve(test.test_method(), test.test_class())
        else {
            debug!("No transactional intent declared for test {}", test_name);
            return Ok(());
        };
        debug!(
            "Explicit transaction definition [{}] found for test {}",
            attribute, test_name
        );

        if attribute.propagation.opts_out() {
            log_transaction_operation(
                events::TRANSACTION_SKIPPED,
                &test_name,
                None,
                None,
                Some("propagation NOT_SUPPORTED"),
            );
            return Ok(());
        }

        let Some(manager) = self.transaction_manager(test, attribute.qualifier())? else {
            if self.lookup.is_strict() {
                return Err(TxTestError::ManagerNotFound { test: test_name });
            }
            warn!(
                test = %test_name,
                "No transaction manager was found for a transactional test; running it without a transaction"
            );
            return Ok(());
        };

        self.transition(key, LifecycleEvent::TransactionRequested)?;

        let opened = self
            .open_transaction(test, manager, attribute)
            .and_then(|context| self.publish(key, context));

        match opened {
            Ok(()) => {
                self.transition(key, LifecycleEvent::TransactionStarted)?;
                Ok(())
            }
            Err(e) => {
                self.transition(key, LifecycleEvent::aborted(e.to_string()))?;
                Err(e)
            }
        }
    }

    /// Publish a started context. If another context claimed the slot first,
    /// the rejected transaction is rolled back before failing.
    fn publish(&self, key: &ExecutionKey, context: TransactionContext) -> Result<()> {
        let Some(mut rejected) = self.holder.try_publish(key.clone(), context) else {
            return Ok(());
        };

        if rejected.is_active() {
            rejected.set_flagged_for_rollback(true);
            if let Err(e) = rejected.end_transaction() {
                log_error(
                    "lifecycle_controller",
                    events::BEFORE_TEST,
                    &e.to_string(),
                    Some(&format!("rolling back unpublished transaction for {}", rejected.test_name())),
                );
            }
        }

        Err(TxTestError::illegal_state(format!(
            "A transaction context was published for {key} while {} was starting",
            rejected.test_name()
        )))
    }

    /// Close the transaction for `test` and run after-transaction hooks
    pub fn after_test(&self, test: &TestContext) -> Result<()> {
        let key = test.execution_key();
        let test_name = test.test_name();
        debug!(operation = events::AFTER_TEST, test = %test_name, key = %key, "Lifecycle phase");

        let Some(mut context) = self.holder.take_current(key) else {
            self.states.remove(key);
            return Ok(());
        };

        let ended = if context.is_active() {
            context.end_transaction()
        } else {
            debug!(
                "Transaction for test {} was already completed by the test body",
                test_name
            );
            Ok(())
        };

        let hooks = self.hooks.run_after_transaction_hooks(test);
        let finished = self.transition(key, LifecycleEvent::TestFinished);

        match (ended, hooks) {
            (Err(end_failure), Err(hook_failure)) => {
                log_error(
                    "lifecycle_controller",
                    events::AFTER_TEST,
                    &end_failure.to_string(),
                    Some(&format!("superseded by after-transaction hook failure in {test_name}")),
                );
                Err(hook_failure)
            }
            (Ok(()), Err(hook_failure)) => Err(hook_failure),
            (Err(end_failure), Ok(())) => Err(end_failure),
            (Ok(()), Ok(())) => finished.map(|_| ()),
        }
    }

    /// Current lifecycle state for `key`; `Idle` when nothing is tracked
    pub fn state(&self, key: &ExecutionKey) -> LifecycleState {
        self.states
            .get(key)
            .map(|state| *state.value())
            .unwrap_or_default()
    }

    pub fn holder(&self) -> &Arc<TransactionContextHolder> {
        &self.holder
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    pub fn configuration_attributes(&self, class: &Arc<TestClass>) -> ConfigurationAttributes {
        self.configuration.resolve(class)
    }

    /// Class-level default rollback for the test's class
    pub fn is_default_rollback(&self, test: &TestContext) -> bool {
        self.configuration_attributes(test.test_class())
            .is_default_rollback()
    }

    /// Method-level rollback override, else the class default
    pub fn is_rollback(&self, test: &TestContext) -> bool {
        let default_rollback = self.is_default_rollback(test);
        let method_override = self
            .metadata
            .find_rollback_override(test.test_method(), test.test_class());

        match method_override {
            Some(rollback) => debug!(
                "Method-level rollback [{}] overrides default rollback [{}] for test {}",
                rollback,
                default_rollback,
                test.test_name()
            ),
            None => debug!(
                "No method-level rollback declared for test {}; using default rollback [{}]",
                test.test_name(),
                default_rollback
            ),
        }

        RollbackPolicyResolver::decide(default_rollback, method_override)
    }

    /// Resolve the manager by qualifier, else by the class's configured name
    pub fn transaction_manager(
        &self,
        test: &TestContext,
        qualifier: Option<&str>,
    ) -> Result<Option<Arc<dyn TransactionManager>>> {
        let configuration = self.configuration_attributes(test.test_class());
        self.lookup.lookup(
            &test.test_name(),
            qualifier,
            configuration.transaction_manager_name(),
        )
    }

    fn open_transaction(
        &self,
        test: &TestContext,
        manager: Arc<dyn TransactionManager>,
        attribute: TransactionAttribute,
    ) -> Result<TransactionContext> {
        self.hooks.run_before_transaction_hooks(test)?;

        let mut context =
            TransactionContext::new(test.test_name(), manager, attribute, self.is_rollback(test));
        context.start_transaction()?;
        Ok(context)
    }

    fn transition(&self, key: &ExecutionKey, event: LifecycleEvent) -> Result<LifecycleState> {
        let current = self.state(key);
        let target = LifecycleStateMachine::determine_target_state(current, &event)?;
        debug!(
            "Lifecycle transition for {}: {} --{}--> {}",
            key,
            current,
            event.event_type(),
            target
        );

        if target == LifecycleState::Idle {
            self.states.remove(key);
        } else {
            self.states.insert(key.clone(), target);
        }
        Ok(target)
    }
}

impl std::fmt::Debug for TransactionLifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLifecycleController")
            .field("configuration", &self.configuration)
            .field("lookup", &self.lookup)
            .field("hooks", &self.hooks)
            .field("live_contexts", &self.holder.len())
            .field("config", &self.config)
            .finish()
    }
}
