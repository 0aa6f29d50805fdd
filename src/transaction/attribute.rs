//! # Transaction Attributes
//!
//! The transactional intent declared by a test method or class, and the
//! resolver that looks it up and names the transaction after the test.

use crate::metadata::{MetadataSource, MethodDescriptor, TestClass};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How a requested transaction relates to one that is already active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    #[default]
    Required,
    Supports,
    Mandatory,
    RequiresNew,
    NotSupported,
    Never,
    Nested,
}

impl Propagation {
    /// Explicit opt-out: the test must never run inside a transaction
    pub fn opts_out(&self) -> bool {
        matches!(self, Self::NotSupported)
    }
}

impl fmt::Display for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Supports => write!(f, "supports"),
            Self::Mandatory => write!(f, "mandatory"),
            Self::RequiresNew => write!(f, "requires_new"),
            Self::NotSupported => write!(f, "not_supported"),
            Self::Never => write!(f, "never"),
            Self::Nested => write!(f, "nested"),
        }
    }
}

impl std::str::FromStr for Propagation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Self::Required),
            "supports" => Ok(Self::Supports),
            "mandatory" => Ok(Self::Mandatory),
            "requires_new" => Ok(Self::RequiresNew),
            "not_supported" => Ok(Self::NotSupported),
            "never" => Ok(Self::Never),
            "nested" => Ok(Self::Nested),
            _ => Err(format!("Invalid propagation mode: {s}")),
        }
    }
}

/// Isolation level forwarded to the transaction manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    /// Whatever the underlying resource uses by default
    #[default]
    Default,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// Resolved transactional intent for one test invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransactionAttribute {
    pub propagation: Propagation,
    pub isolation: Isolation,
    pub read_only: bool,
    pub timeout: Option<Duration>,
    /// Names a specific transaction manager; empty is treated as absent
    pub qualifier: Option<String>,
    /// Transaction name shown by the manager
    pub name: Option<String>,
}

impl TransactionAttribute {
    pub fn required() -> Self {
        Self::default()
    }

    pub fn not_supported() -> Self {
        Self::default().with_propagation(Propagation::NotSupported)
    }

    pub fn with_propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The qualifier, if one with text was declared
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier
            .as_deref()
            .filter(|qualifier| !qualifier.trim().is_empty())
    }

    /// Name the transaction after the test unless the declaration named it
    pub fn for_test(mut self, test_name: &str) -> Self {
        if self.name.is_none() {
            self.name = Some(test_name.to_string());
        }
        self
    }
}

impl fmt::Display for TransactionAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.propagation)?;
        if self.read_only {
            write!(f, ",read_only")?;
        }
        if let Some(qualifier) = self.qualifier() {
            write!(f, ",qualifier={qualifier}")?;
        }
        if let Some(name) = &self.name {
            write!(f, ",name={name}")?;
        }
        Ok(())
    }
}

/// Looks up the transactional intent of a test method
pub struct TransactionAttributeResolver {
    metadata: Arc<dyn MetadataSource>,
}

impl TransactionAttributeResolver {
    pub fn new(metadata: Arc<dyn MetadataSource>) -> Self {
        Self { metadata }
    }

    /// `None` when no transactional intent is declared anywhere in the hierarchy
    pub fn resolve(
        &self,
        method: &MethodDescriptor,
        class: &TestClass,
    ) -> Option<TransactionAttribute> {
        self.metadata
            .find_transaction_attribute(method, class)
            .map(|attribute| attribute.for_test(&format!("{}.{}", class.name(), method.name())))
    }
}

impl fmt::Debug for TransactionAttributeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionAttributeResolver")
            .field("metadata", &"MetadataSource")
            .finish()
    }
}
