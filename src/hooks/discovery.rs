//! Hook discovery over a test class hierarchy.
//!
//! Classes are walked most-derived first, each in declaration order. A hook
//! whose name and parameter types match one already collected from a more
//! derived class is shadowed and skipped.

use crate::metadata::{HookPhase, MethodSignature, TestClass};
use std::fmt;

/// A discovered hook: where it is declared and what it is
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookMethod {
    pub declaring_class: String,
    pub signature: MethodSignature,
    pub phase: HookPhase,
}

impl fmt::Display for HookMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_class, self.signature)
    }
}

/// Hooks for `phase` in discovery order (subclass to superclass)
pub fn discover_hooks(class: &TestClass, phase: HookPhase) -> Vec<HookMethod> {
    let mut results: Vec<HookMethod> = Vec::new();

    for level in class.hierarchy() {
        for method in level.declared_methods() {
            if method.hook != Some(phase) || is_shadowed(&method.signature, &results) {
                continue;
            }
            results.push(HookMethod {
                declaring_class: level.name().to_string(),
                signature: method.signature.clone(),
                phase,
            });
        }
    }

    results
}

fn is_shadowed(candidate: &MethodSignature, collected: &[HookMethod]) -> bool {
    collected
        .iter()
        .any(|previous| candidate.is_shadowed_by(&previous.signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MethodDescriptor;
    use std::sync::Arc;

    fn names(hooks: &[HookMethod]) -> Vec<String> {
        hooks.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_subclass_first_declaration_order() {
        let base = Arc::new(
            TestClass::new("Base")
                .with_method(MethodDescriptor::before_transaction("openFixtures"))
                .with_method(MethodDescriptor::before_transaction("seedUsers")),
        );
        let leaf = TestClass::new("Leaf")
            .extends(base)
            .with_method(MethodDescriptor::before_transaction("seedOrders"));

        assert_eq!(
            names(&discover_hooks(&leaf, HookPhase::BeforeTransaction)),
            vec![
                "Leaf::seedOrders()",
                "Base::openFixtures()",
                "Base::seedUsers()"
            ]
        );
    }

    #[test]
    fn test_redeclared_hook_shadows_ancestor() {
        let base = Arc::new(
            TestClass::new("Base").with_method(MethodDescriptor::before_transaction("before")),
        );
        let leaf = TestClass::new("Leaf")
            .extends(base)
            .with_method(MethodDescriptor::before_transaction("before"));

        assert_eq!(
            names(&discover_hooks(&leaf, HookPhase::BeforeTransaction)),
            vec!["Leaf::before()"]
        );
    }

    #[test]
    fn test_overload_does_not_shadow() {
        let base = Arc::new(
            TestClass::new("Base").with_method(MethodDescriptor::after_transaction("verify")),
        );
        let leaf = TestClass::new("Leaf").extends(base).with_method(
            MethodDescriptor::after_transaction("verify").with_parameters(["Connection"]),
        );

        assert_eq!(
            names(&discover_hooks(&leaf, HookPhase::AfterTransaction)),
            vec!["Leaf::verify(Connection)", "Base::verify()"]
        );
    }

    #[test]
    fn test_phases_are_discovered_separately() {
        let class = TestClass::new("Suite")
            .with_method(MethodDescriptor::before_transaction("setUp"))
            .with_method(MethodDescriptor::after_transaction("tearDown"))
            .with_method(MethodDescriptor::new("savesOrder"));

        assert_eq!(
            names(&discover_hooks(&class, HookPhase::BeforeTransaction)),
            vec!["Suite::setUp()"]
        );
        assert_eq!(
            names(&discover_hooks(&class, HookPhase::AfterTransaction)),
            vec!["Suite::tearDown()"]
        );
    }
}
