//! # Test Metadata
//!
//! The metadata table that stands in for annotation introspection: a test
//! class hierarchy described explicitly, plus the [`MetadataSource`] lookups
//! the lifecycle controller performs against it.

pub mod model;
pub mod source;

pub use model::{
    ClassConfiguration, ClassKey, HookPhase, MethodDescriptor, MethodSignature, TestClass,
};
pub use source::{DeclaredMetadataSource, MetadataSource};
