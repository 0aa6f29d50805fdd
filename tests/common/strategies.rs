//! Proptest strategies for test class hierarchies

use proptest::prelude::*;
use std::sync::Arc;
use txtest_core::metadata::{MethodDescriptor, TestClass};

/// Hook names drawn from a small pool so that redeclarations (shadowing) are common
pub fn hook_name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["setUp", "seed", "openFixtures", "prime", "reset"])
        .prop_map(str::to_string)
}

/// Per level, an ordered list of before-transaction hook names (duplicates removed)
pub fn hierarchy_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec(hook_name_strategy(), 0..4).prop_map(|mut names| {
            let mut seen = std::collections::HashSet::new();
            names.retain(|name| seen.insert(name.clone()));
            names
        }),
        1..5,
    )
}

/// Class name for a hierarchy level; level 0 is the root ancestor
pub fn level_name(level: usize) -> String {
    format!("Level{level}")
}

/// Build the hierarchy with `levels[0]` as the root ancestor and the last entry as the leaf
pub fn build_hierarchy(levels: &[Vec<String>]) -> Arc<TestClass> {
    let mut parent: Option<Arc<TestClass>> = None;
    for (index, hooks) in levels.iter().enumerate() {
        let mut class = TestClass::new(level_name(index));
        if let Some(parent) = parent.take() {
            class = class.extends(parent);
        }
        for hook in hooks {
            class = class.with_method(MethodDescriptor::before_transaction(hook.clone()));
        }
        parent = Some(Arc::new(class));
    }
    parent.expect("hierarchy has at least one level")
}
