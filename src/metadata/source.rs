//! Metadata lookups honoring declaration precedence.

use super::model::{ClassConfiguration, MethodDescriptor, TestClass};
use crate::transaction::TransactionAttribute;

/// Pure lookups over test metadata; "absent" when nothing is declared.
///
/// Precedence is method > class > superclass; built-in defaults are applied
/// by the caller, not by the source.
pub trait MetadataSource: Send + Sync {
    fn find_transaction_attribute(
        &self,
        method: &MethodDescriptor,
        class: &TestClass,
    ) -> Option<TransactionAttribute>;

    fn find_rollback_override(&self, method: &MethodDescriptor, class: &TestClass)
        -> Option<bool>;

    fn find_class_config(&self, class: &TestClass) -> Option<ClassConfiguration>;
}

/// Reads the declarations carried by the [`TestClass`] model itself
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredMetadataSource;

impl MetadataSource for DeclaredMetadataSource {
    fn find_transaction_attribute(
        &self,
        method: &MethodDescriptor,
        class: &TestClass,
    ) -> Option<TransactionAttribute> {
        method.transactional.clone().or_else(|| {
            class
                .hierarchy()
                .find_map(|level| level.declared_transactional().cloned())
        })
    }

    fn find_rollback_override(
        &self,
        method: &MethodDescriptor,
        class: &TestClass,
    ) -> Option<bool> {
        // An overridden method inherits the override of the method it replaces
        method.rollback.or_else(|| {
            class
                .hierarchy()
                .flat_map(|level| level.declared_methods().iter())
                .filter(|declared| declared.signature == method.signature)
                .find_map(|declared| declared.rollback)
        })
    }

    fn find_class_config(&self, class: &TestClass) -> Option<ClassConfiguration> {
        class
            .hierarchy()
            .find_map(|level| level.declared_configuration().cloned())
    }
}
