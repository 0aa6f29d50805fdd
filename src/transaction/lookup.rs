//! Resolution of the transaction manager for a test invocation.

use super::manager::TransactionManager;
use crate::error::Result;
use crate::registry::{LookupError, ManagerContainer};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Resolves a manager from a qualifier or the configured manager name
pub struct TransactionManagerLookup {
    container: Arc<dyn ManagerContainer>,
    strict: bool,
}

impl TransactionManagerLookup {
    /// `strict` makes name/primary lookup failures propagate instead of
    /// resolving to "no manager"
    pub fn new(container: Arc<dyn ManagerContainer>, strict: bool) -> Self {
        Self { container, strict }
    }

    /// A non-empty qualifier is always resolved against the container and its
    /// failures propagate unchanged; otherwise `manager_name` is used.
    pub fn lookup(
        &self,
        test_name: &str,
        qualifier: Option<&str>,
        manager_name: &str,
    ) -> Result<Option<Arc<dyn TransactionManager>>> {
        if let Some(qualifier) = qualifier.filter(|q| !q.trim().is_empty()) {
            return match self.container.lookup_by_qualifier(qualifier) {
                Ok(manager) => Ok(Some(manager)),
                Err(e) => {
                    warn!(
                        "Caught exception while retrieving transaction manager with qualifier '{}' for test context {}: {}",
                        qualifier, test_name, e
                    );
                    Err(e.into())
                }
            };
        }

        match self.container.lookup_by_name_or_primary(manager_name) {
            Ok(manager) => Ok(manager),
            // A broken container setup is never treated as "no manager"
            Err(e @ LookupError::Misconfigured(_)) => Err(e.into()),
            Err(e) if self.strict => Err(e.into()),
            Err(e) => {
                warn!(
                    manager_name = %manager_name,
                    test = %test_name,
                    error = %e,
                    "Transaction manager could not be resolved; continuing without one"
                );
                Ok(None)
            }
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl fmt::Debug for TransactionManagerLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionManagerLookup")
            .field("container", &"ManagerContainer")
            .field("strict", &self.strict)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxTestError;
    use crate::registry::{ManagerRegistration, ManagerRegistry, ManagerSelector};
    use crate::test_utils::InMemoryTransactionManager;

    fn registry_with(names: &[&str]) -> Arc<ManagerRegistry> {
        let registry = Arc::new(ManagerRegistry::new());
        for name in names {
            registry
                .register(ManagerRegistration::new(
                    *name,
                    Arc::new(InMemoryTransactionManager::new(*name)),
                ))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_qualifier_failure_propagates_even_when_lenient() {
        let lookup = TransactionManagerLookup::new(registry_with(&["jdbcTx"]), false);
        let err = lookup
            .lookup("Suite.case", Some("billing"), "")
            .err()
            .unwrap();
        assert!(matches!(
            err,
            TxTestError::ManagerLookup(LookupError::NoSuchManager(_))
        ));
    }

    #[test]
    fn test_blank_qualifier_falls_back_to_name() {
        let lookup = TransactionManagerLookup::new(registry_with(&["jdbcTx"]), false);
        let manager = lookup.lookup("Suite.case", Some(""), "").unwrap().unwrap();
        assert_eq!(manager.name(), "jdbcTx");
    }

    #[test]
    fn test_lenient_swallows_ambiguity() {
        let lookup = TransactionManagerLookup::new(registry_with(&["a", "b"]), false);
        assert!(lookup.lookup("Suite.case", None, "").unwrap().is_none());
    }

    #[test]
    fn test_strict_propagates_ambiguity() {
        let lookup = TransactionManagerLookup::new(registry_with(&["a", "b"]), true);
        assert!(lookup.is_strict());
        assert!(matches!(
            lookup.lookup("Suite.case", None, ""),
            Err(TxTestError::ManagerLookup(LookupError::NoUniqueManager { .. }))
        ));
    }

    #[derive(Debug)]
    struct FirstManager(Arc<dyn TransactionManager>);

    impl ManagerSelector for FirstManager {
        fn select(&self) -> Arc<dyn TransactionManager> {
            Arc::clone(&self.0)
        }
    }

    #[test]
    fn test_misconfigured_container_propagates_even_when_lenient() {
        let registry = registry_with(&["a", "b"]);
        let manager: Arc<dyn TransactionManager> = Arc::new(InMemoryTransactionManager::new("a"));
        registry.add_selector(Arc::new(FirstManager(Arc::clone(&manager))));
        registry.add_selector(Arc::new(FirstManager(manager)));

        let lookup = TransactionManagerLookup::new(registry, false);
        assert!(matches!(
            lookup.lookup("Suite.case", None, ""),
            Err(TxTestError::ManagerLookup(LookupError::Misconfigured(_)))
        ));
    }
}
