//! Test instances that hooks are invoked on.

use super::discovery::HookMethod;
use crate::metadata::MethodSignature;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Outcome of invoking a hook on a test instance
#[derive(Debug, Error)]
pub enum HookInvocationError {
    /// The hook ran and raised; carries the user's own failure
    #[error("{0}")]
    Failed(anyhow::Error),

    /// The hook could not be called at all (framework-level problem)
    #[error("hook {hook} is not invocable: {reason}")]
    NotInvocable { hook: String, reason: String },
}

/// The live test object on which hooks run, with no arguments
pub trait TestInstance: Send + Sync {
    fn invoke_hook(&self, hook: &HookMethod) -> Result<(), HookInvocationError>;
}

type HookFn = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// A test instance assembled from closures, keyed by declaring class and signature
#[derive(Default)]
pub struct FnTestInstance {
    hooks: HashMap<(String, MethodSignature), HookFn>,
}

impl FnTestInstance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the body of a no-argument hook declared as `class::name()`
    pub fn on<F>(self, class: impl Into<String>, name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_signature(class, MethodSignature::new(name), body)
    }

    pub fn on_signature<F>(
        mut self,
        class: impl Into<String>,
        signature: MethodSignature,
        body: F,
    ) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.insert((class.into(), signature), Box::new(body));
        self
    }
}

impl TestInstance for FnTestInstance {
    fn invoke_hook(&self, hook: &HookMethod) -> Result<(), HookInvocationError> {
        let body = self
            .hooks
            .get(&(hook.declaring_class.clone(), hook.signature.clone()))
            .ok_or_else(|| HookInvocationError::NotInvocable {
                hook: hook.to_string(),
                reason: "no body bound on this test instance".to_string(),
            })?;
        body().map_err(HookInvocationError::Failed)
    }
}

impl fmt::Debug for FnTestInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bound: Vec<String> = self
            .hooks
            .keys()
            .map(|(class, signature)| format!("{class}::{signature}"))
            .collect();
        bound.sort();
        f.debug_struct("FnTestInstance").field("hooks", &bound).finish()
    }
}
