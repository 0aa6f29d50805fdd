//! # Current-Context Holder
//!
//! Thread-scoped slot that lets code inside a test body find the transaction
//! the lifecycle opened for it. Keyed by [`ExecutionKey`] and injected into the
//! controller, so several simulated "threads" can be driven deterministically.

use super::context::TransactionContext;
use crate::error::{Result, TxTestError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::thread::ThreadId;

/// Identity of the thread or task executing a test
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExecutionKey {
    Thread(ThreadId),
    Named(String),
}

impl ExecutionKey {
    /// Key of the calling OS thread
    pub fn current() -> Self {
        Self::Thread(std::thread::current().id())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for ExecutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thread(id) => write!(f, "{id:?}"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// At most one [`TransactionContext`] per execution key
#[derive(Debug, Default)]
pub struct TransactionContextHolder {
    contexts: DashMap<ExecutionKey, TransactionContext>,
}

impl TransactionContextHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the context for `key`; the slot must be empty
    pub fn publish(&self, key: ExecutionKey, context: TransactionContext) -> Result<()> {
        let described = key.to_string();
        match self.try_publish(key, context) {
            None => Ok(()),
            Some(_) => Err(TxTestError::illegal_state(format!(
                "A transaction context is already published for {described}"
            ))),
        }
    }

    /// Publish into an empty slot, handing the context back when occupied
    pub fn try_publish(
        &self,
        key: ExecutionKey,
        context: TransactionContext,
    ) -> Option<TransactionContext> {
        match self.contexts.entry(key) {
            Entry::Occupied(_) => Some(context),
            Entry::Vacant(vacant) => {
                vacant.insert(context);
                None
            }
        }
    }

    /// Remove and return the context for `key`, leaving the slot empty
    pub fn take_current(&self, key: &ExecutionKey) -> Option<TransactionContext> {
        self.contexts.remove(key).map(|(_, context)| context)
    }

    pub fn contains(&self, key: &ExecutionKey) -> bool {
        self.contexts.contains_key(key)
    }

    /// Run `f` against the published context without taking it
    pub fn with_current<R>(
        &self,
        key: &ExecutionKey,
        f: impl FnOnce(&mut TransactionContext) -> R,
    ) -> Option<R> {
        self.contexts.get_mut(key).map(|mut context| f(&mut *context))
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
