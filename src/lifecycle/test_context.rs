//! Per-invocation view of the test being executed.

use crate::error::{Result, TxTestError};
use crate::hooks::TestInstance;
use crate::metadata::{MethodDescriptor, TestClass};
use crate::transaction::ExecutionKey;
use std::fmt;
use std::sync::Arc;

/// The test class, method and instance for one test invocation, plus the
/// execution key its transaction context is published under
pub struct TestContext {
    test_class: Arc<TestClass>,
    test_method: MethodDescriptor,
    test_instance: Arc<dyn TestInstance>,
    execution_key: ExecutionKey,
}

impl TestContext {
    /// Bind `method_name` on `test_class`, executing on the calling thread.
    ///
    /// Fails with [`TxTestError::IllegalState`] when no such method is declared
    /// anywhere in the hierarchy.
    pub fn new(
        test_class: Arc<TestClass>,
        method_name: &str,
        test_instance: Arc<dyn TestInstance>,
    ) -> Result<Self> {
        let test_method = test_class
            .find_method(method_name)
            .cloned()
            .ok_or_else(|| {
                TxTestError::illegal_state(format!(
                    "Test method {method_name} is not declared on {test_class} or its ancestors"
                ))
            })?;

        Ok(Self {
            test_class,
            test_method,
            test_instance,
            execution_key: ExecutionKey::current(),
        })
    }

    pub fn with_execution_key(mut self, key: ExecutionKey) -> Self {
        self.execution_key = key;
        self
    }

    pub fn test_class(&self) -> &Arc<TestClass> {
        &self.test_class
    }

    pub fn test_method(&self) -> &MethodDescriptor {
        &self.test_method
    }

    pub fn test_instance(&self) -> &dyn TestInstance {
        self.test_instance.as_ref()
    }

    pub fn execution_key(&self) -> &ExecutionKey {
        &self.execution_key
    }

    /// `Class.method`, also used as the transaction name
    pub fn test_name(&self) -> String {
        format!("{}.{}", self.test_class.name(), self.test_method.name())
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("test_class", &self.test_class.name())
            .field("test_method", &self.test_method.signature)
            .field("execution_key", &self.execution_key)
            .finish()
    }
}

impl fmt::Display for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.test_name(), self.execution_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::FnTestInstance;

    #[test]
    fn test_binds_inherited_method() {
        let base = Arc::new(TestClass::new("Base").with_method(MethodDescriptor::new("savesOrder")));
        let class = Arc::new(TestClass::new("Leaf").extends(base));

        let ctx = TestContext::new(class, "savesOrder", Arc::new(FnTestInstance::new()))
            .unwrap()
            .with_execution_key(ExecutionKey::named("worker-1"));

        assert_eq!(ctx.test_name(), "Leaf.savesOrder");
        assert_eq!(ctx.to_string(), "Leaf.savesOrder on worker-1");
    }

    #[test]
    fn test_unknown_method_rejected() {
        let class = Arc::new(TestClass::new("Suite"));
        let result = TestContext::new(class, "missing", Arc::new(FnTestInstance::new()));
        assert!(matches!(result, Err(TxTestError::IllegalState(_))));
    }
}
