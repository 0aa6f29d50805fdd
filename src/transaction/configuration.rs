//! Class-level transaction configuration, resolved once per test class.

use crate::config::ListenerConfig;
use crate::metadata::{ClassKey, MetadataSource, TestClass};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Effective manager name and default rollback flag for one test class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationAttributes {
    transaction_manager_name: String,
    default_rollback: bool,
}

impl ConfigurationAttributes {
    pub fn new(transaction_manager_name: impl Into<String>, default_rollback: bool) -> Self {
        Self {
            transaction_manager_name: transaction_manager_name.into(),
            default_rollback,
        }
    }

    pub fn transaction_manager_name(&self) -> &str {
        &self.transaction_manager_name
    }

    pub fn is_default_rollback(&self) -> bool {
        self.default_rollback
    }
}

impl fmt::Display for ConfigurationAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[transactionManagerName = '{}', defaultRollback = {}]",
            self.transaction_manager_name, self.default_rollback
        )
    }
}

/// Resolves [`ConfigurationAttributes`] and caches them per test class.
///
/// Attributes are stable for every method of a class for the lifetime of
/// the resolver.
pub struct ConfigurationResolver {
    metadata: Arc<dyn MetadataSource>,
    fallback: ConfigurationAttributes,
    cache: DashMap<ClassKey, ConfigurationAttributes>,
}

impl ConfigurationResolver {
    pub fn new(metadata: Arc<dyn MetadataSource>, config: &ListenerConfig) -> Self {
        Self {
            metadata,
            fallback: ConfigurationAttributes::new(
                config.default_transaction_manager.clone(),
                config.default_rollback,
            ),
            cache: DashMap::new(),
        }
    }

    /// Classes are cached by identity; same-named hierarchies resolve separately
    pub fn resolve(&self, class: &Arc<TestClass>) -> ConfigurationAttributes {
        let key = ClassKey::of(class);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let declared = self.metadata.find_class_config(class);
        debug!(
            "Retrieved class transaction configuration {:?} for test class [{}]",
            declared, class
        );

        let attributes = match declared {
            Some(config) => {
                ConfigurationAttributes::new(config.transaction_manager, config.default_rollback)
            }
            None => self.fallback.clone(),
        };
        debug!(
            "Resolved ConfigurationAttributes {} for class [{}]",
            attributes, class
        );

        // First resolution wins if two threads raced on the same class
        self.cache
            .entry(key)
            .or_insert(attributes)
            .clone()
    }

    pub fn cached_classes(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Debug for ConfigurationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationResolver")
            .field("fallback", &self.fallback)
            .field("cached_classes", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ClassConfiguration, DeclaredMetadataSource};

    fn resolver(config: &ListenerConfig) -> ConfigurationResolver {
        ConfigurationResolver::new(Arc::new(DeclaredMetadataSource), config)
    }

    #[test]
    fn test_falls_back_to_listener_defaults() {
        let resolver = resolver(&ListenerConfig::default());
        let attrs = resolver.resolve(&Arc::new(TestClass::new("Plain")));
        assert_eq!(attrs.transaction_manager_name(), "");
        assert!(attrs.is_default_rollback());
    }

    #[test]
    fn test_declared_configuration_is_used_and_cached() {
        let resolver = resolver(&ListenerConfig::default());
        let class = Arc::new(
            TestClass::new("AuditTests").with_configuration(ClassConfiguration::new("auditTx", false)),
        );

        let first = resolver.resolve(&class);
        assert_eq!(first.transaction_manager_name(), "auditTx");
        assert!(!first.is_default_rollback());

        let second = resolver.resolve(&class);
        assert_eq!(first, second);
        assert_eq!(resolver.cached_classes(), 1);
    }

    #[test]
    fn test_classes_are_cached_independently() {
        let resolver = resolver(&ListenerConfig::default());
        let audit = Arc::new(
            TestClass::new("AuditTests").with_configuration(ClassConfiguration::new("auditTx", false)),
        );
        let plain = Arc::new(TestClass::new("PlainTests"));

        assert_eq!(resolver.resolve(&audit).transaction_manager_name(), "auditTx");
        assert_eq!(resolver.resolve(&plain).transaction_manager_name(), "");
        assert_eq!(resolver.cached_classes(), 2);
    }

    #[test]
    fn test_same_named_classes_resolve_separately() {
        let resolver = resolver(&ListenerConfig::default());
        let rolls_back = Arc::new(TestClass::new("Suite"));
        let commits = Arc::new(
            TestClass::new("Suite").with_configuration(ClassConfiguration::new("", false)),
        );

        assert!(resolver.resolve(&rolls_back).is_default_rollback());
        assert!(!resolver.resolve(&commits).is_default_rollback());
        assert_eq!(resolver.cached_classes(), 2);
    }
}
