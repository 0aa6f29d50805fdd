//! # Transaction Hooks
//!
//! Discovery and execution of the before/after-transaction hooks declared on a
//! test class hierarchy.

pub mod discovery;
pub mod instance;
pub mod runner;

pub use discovery::{discover_hooks, HookMethod};
pub use instance::{FnTestInstance, HookInvocationError, TestInstance};
pub use runner::HookRunner;
