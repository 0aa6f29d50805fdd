//! # Test Lifecycle
//!
//! The before/after-test entry points that a test runner drives for every
//! test method, and the per-invocation [`TestContext`] they operate on.

pub mod controller;
pub mod test_context;

pub use controller::TransactionLifecycleController;
pub use test_context::TestContext;
