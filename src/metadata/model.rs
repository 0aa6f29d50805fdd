//! # Test Class Metadata Model
//!
//! Explicit, declaration-order description of a test class hierarchy: which
//! methods exist, which are transaction hooks, and what transactional intent
//! and configuration each level declares.

use crate::transaction::TransactionAttribute;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Method identity used for shadow detection: name plus ordered parameter types.
///
/// Return type and modifiers are deliberately not part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub parameter_types: Vec<String>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_types: Vec::new(),
        }
    }

    pub fn with_parameters<I, S>(mut self, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_types = parameter_types.into_iter().map(Into::into).collect();
        self
    }

    /// True when `self`, declared higher in the hierarchy, is hidden by `other`
    pub fn is_shadowed_by(&self, other: &MethodSignature) -> bool {
        self.name == other.name && self.parameter_types == other.parameter_types
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.parameter_types.join(", "))
    }
}

/// Which side of the transaction boundary a hook runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPhase {
    BeforeTransaction,
    AfterTransaction,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeTransaction => write!(f, "before_transaction"),
            Self::AfterTransaction => write!(f, "after_transaction"),
        }
    }
}

/// Class-level transaction configuration declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassConfiguration {
    /// Manager name; empty resolves the unique or primary manager
    pub transaction_manager: String,
    pub default_rollback: bool,
}

impl ClassConfiguration {
    pub fn new(transaction_manager: impl Into<String>, default_rollback: bool) -> Self {
        Self {
            transaction_manager: transaction_manager.into(),
            default_rollback,
        }
    }
}

/// A method declared on a test class, with the metadata attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub signature: MethodSignature,
    pub hook: Option<HookPhase>,
    pub transactional: Option<TransactionAttribute>,
    pub rollback: Option<bool>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            signature: MethodSignature::new(name),
            hook: None,
            transactional: None,
            rollback: None,
        }
    }

    pub fn before_transaction(name: impl Into<String>) -> Self {
        Self::new(name).with_hook(HookPhase::BeforeTransaction)
    }

    pub fn after_transaction(name: impl Into<String>) -> Self {
        Self::new(name).with_hook(HookPhase::AfterTransaction)
    }

    pub fn with_parameters<I, S>(mut self, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signature = self.signature.with_parameters(parameter_types);
        self
    }

    pub fn with_hook(mut self, phase: HookPhase) -> Self {
        self.hook = Some(phase);
        self
    }

    pub fn transactional(mut self, attribute: TransactionAttribute) -> Self {
        self.transactional = Some(attribute);
        self
    }

    pub fn rollback(mut self, rollback: bool) -> Self {
        self.rollback = Some(rollback);
        self
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }
}

/// One level of a test class hierarchy.
///
/// The chain ends at the last class with no parent; there is no implicit root type.
#[derive(Debug, Clone, PartialEq)]
pub struct TestClass {
    name: String,
    parent: Option<Arc<TestClass>>,
    transactional: Option<TransactionAttribute>,
    configuration: Option<ClassConfiguration>,
    methods: Vec<MethodDescriptor>,
}

impl TestClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            transactional: None,
            configuration: None,
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: Arc<TestClass>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn transactional(mut self, attribute: TransactionAttribute) -> Self {
        self.transactional = Some(attribute);
        self
    }

    pub fn with_configuration(mut self, configuration: ClassConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Declare a method; declaration order is preserved
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&TestClass> {
        self.parent.as_deref()
    }

    pub fn declared_transactional(&self) -> Option<&TransactionAttribute> {
        self.transactional.as_ref()
    }

    pub fn declared_configuration(&self) -> Option<&ClassConfiguration> {
        self.configuration.as_ref()
    }

    pub fn declared_methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// This class followed by its ancestors, most derived first
    pub fn hierarchy(&self) -> impl Iterator<Item = &TestClass> {
        std::iter::successors(Some(self), |&class| class.parent())
    }

    /// Find a method by name, searching this class before its ancestors
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.hierarchy()
            .flat_map(|class| class.methods.iter())
            .find(|method| method.name() == name)
    }
}

impl fmt::Display for TestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Cache key for one [`TestClass`] by allocation identity.
///
/// Two hierarchies that share a name are different keys. The key holds its
/// class alive, so an address is never reused while it is cached.
#[derive(Clone)]
pub struct ClassKey(Arc<TestClass>);

impl ClassKey {
    pub fn of(class: &Arc<TestClass>) -> Self {
        Self(Arc::clone(class))
    }
}

impl PartialEq for ClassKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ClassKey {}

impl std::hash::Hash for ClassKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassKey({}@{:p})", self.0.name(), Arc::as_ptr(&self.0))
    }
}
