//! # Hook Runner
//!
//! Executes discovered transaction hooks around the transaction boundary.
//!
//! Before-transaction hooks run superclass first (discovery order reversed)
//! and stop at the first failure. After-transaction hooks run subclass first,
//! every one of them runs, and the first failure is reported once all have
//! finished.

use super::discovery::{discover_hooks, HookMethod};
use super::instance::HookInvocationError;
use crate::constants::events;
use crate::error::{Result, TxTestError};
use crate::lifecycle::TestContext;
use crate::logging::{log_error, log_hook_operation};
use crate::metadata::{ClassKey, HookPhase, TestClass};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Runs hooks, caching discovery per (class identity, phase)
#[derive(Debug, Default)]
pub struct HookRunner {
    discovered: DashMap<(ClassKey, HookPhase), Arc<[HookMethod]>>,
}

impl HookRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks for `phase` in discovery order (subclass to superclass)
    pub fn hooks_for(&self, class: &Arc<TestClass>, phase: HookPhase) -> Arc<[HookMethod]> {
        let key = (ClassKey::of(class), phase);
        if let Some(hooks) = self.discovered.get(&key) {
            return hooks.value().clone();
        }

        let hooks: Arc<[HookMethod]> = discover_hooks(class, phase).into();
        debug!(
            "Discovered {} {} hook(s) for test class [{}]",
            hooks.len(),
            phase,
            class
        );
        self.discovered.entry(key).or_insert(hooks).value().clone()
    }

    /// Run before-transaction hooks superclass first, stopping at the first failure.
    ///
    /// A failing hook's own error comes back as [`TxTestError::BeforeHook`].
    pub fn run_before_transaction_hooks(&self, test: &TestContext) -> Result<()> {
        let hooks = self.hooks_for(test.test_class(), HookPhase::BeforeTransaction);
        let test_name = test.test_name();

        for hook in hooks.iter().rev() {
            log_hook_operation(events::BEFORE_TRANSACTION_HOOK, &test_name, &hook.to_string());
            if let Err(e) = test.test_instance().invoke_hook(hook) {
                log_error(
                    "hook_runner",
                    events::BEFORE_TRANSACTION_HOOK,
                    &e.to_string(),
                    Some(&format!("{hook} for {test_name}")),
                );
                return Err(match e {
                    HookInvocationError::Failed(source) => TxTestError::BeforeHook {
                        hook: hook.to_string(),
                        source,
                    },
                    HookInvocationError::NotInvocable { hook, reason } => {
                        TxTestError::HookInvocation { hook, reason }
                    }
                });
            }
        }
        Ok(())
    }

    /// Run every after-transaction hook subclass first; returns the first failure
    pub fn run_after_transaction_hooks(&self, test: &TestContext) -> Result<()> {
        let hooks = self.hooks_for(test.test_class(), HookPhase::AfterTransaction);
        let test_name = test.test_name();
        let mut first_failure: Option<TxTestError> = None;

        for hook in hooks.iter() {
            log_hook_operation(events::AFTER_TRANSACTION_HOOK, &test_name, &hook.to_string());
            if let Err(e) = test.test_instance().invoke_hook(hook) {
                log_error(
                    "hook_runner",
                    events::AFTER_TRANSACTION_HOOK,
                    &e.to_string(),
                    Some(&format!("{hook} for {test_name}")),
                );
                if first_failure.is_none() {
                    let source = match e {
                        HookInvocationError::Failed(source) => source,
                        other => anyhow::Error::new(other),
                    };
                    first_failure = Some(TxTestError::AfterHook {
                        hook: hook.to_string(),
                        source,
                    });
                }
            }
        }

        first_failure.map_or(Ok(()), Err)
    }

    pub fn cached_entries(&self) -> usize {
        self.discovered.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::FnTestInstance;
    use crate::metadata::MethodDescriptor;
    use crate::test_utils::InvocationLog;

    fn suite() -> Arc<TestClass> {
        let base = Arc::new(
            TestClass::new("Base")
                .with_method(MethodDescriptor::before_transaction("openFixtures"))
                .with_method(MethodDescriptor::after_transaction("closeFixtures")),
        );
        Arc::new(
            TestClass::new("Leaf")
                .extends(base)
                .with_method(MethodDescriptor::before_transaction("seed"))
                .with_method(MethodDescriptor::after_transaction("verify"))
                .with_method(MethodDescriptor::new("savesOrder")),
        )
    }

    fn context(instance: FnTestInstance) -> TestContext {
        TestContext::new(suite(), "savesOrder", Arc::new(instance)).unwrap()
    }

    #[test]
    fn test_before_hooks_run_superclass_first() {
        let log = InvocationLog::new();
        let instance = FnTestInstance::new()
            .on("Base", "openFixtures", log.recording_hook("Base.openFixtures"))
            .on("Leaf", "seed", log.recording_hook("Leaf.seed"));

        HookRunner::new()
            .run_before_transaction_hooks(&context(instance))
            .unwrap();
        assert_eq!(log.entries(), vec!["Base.openFixtures", "Leaf.seed"]);
    }

    #[test]
    fn test_before_hook_failure_stops_remaining() {
        let log = InvocationLog::new();
        let instance = FnTestInstance::new()
            .on("Base", "openFixtures", InvocationLog::failing_hook("fixtures missing"))
            .on("Leaf", "seed", log.recording_hook("Leaf.seed"));

        let err = HookRunner::new()
            .run_before_transaction_hooks(&context(instance))
            .unwrap_err();
        assert!(log.entries().is_empty());
        assert_eq!(err.into_cause().unwrap().to_string(), "fixtures missing");
    }

    #[test]
    fn test_unbound_before_hook_is_invocation_error() {
        let err = HookRunner::new()
            .run_before_transaction_hooks(&context(FnTestInstance::new()))
            .unwrap_err();
        assert!(matches!(err, TxTestError::HookInvocation { .. }));
    }

    #[test]
    fn test_after_hooks_all_run_and_first_failure_reported() {
        let log = InvocationLog::new();
        let instance = FnTestInstance::new()
            .on("Leaf", "verify", InvocationLog::failing_hook("verify failed"))
            .on("Base", "closeFixtures", log.recording_hook("Base.closeFixtures"));

        let err = HookRunner::new()
            .run_after_transaction_hooks(&context(instance))
            .unwrap_err();
        assert_eq!(log.entries(), vec!["Base.closeFixtures"]);
        match err {
            TxTestError::AfterHook { hook, source } => {
                assert_eq!(hook, "Leaf::verify()");
                assert_eq!(source.to_string(), "verify failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_discovery_is_cached_per_class_and_phase() {
        let runner = HookRunner::new();
        let class = suite();
        let first = runner.hooks_for(&class, HookPhase::BeforeTransaction);
        let second = runner.hooks_for(&class, HookPhase::BeforeTransaction);
        assert!(Arc::ptr_eq(&first, &second));
        runner.hooks_for(&class, HookPhase::AfterTransaction);
        assert_eq!(runner.cached_entries(), 2);
    }

    #[test]
    fn test_same_named_classes_discover_their_own_hooks() {
        let runner = HookRunner::new();
        let without_hooks = Arc::new(TestClass::new("Suite"));
        let with_seed = Arc::new(
            TestClass::new("Suite").with_method(MethodDescriptor::before_transaction("seed")),
        );

        assert!(runner
            .hooks_for(&without_hooks, HookPhase::BeforeTransaction)
            .is_empty());
        assert_eq!(
            runner.hooks_for(&with_seed, HookPhase::BeforeTransaction).len(),
            1
        );
    }
}
