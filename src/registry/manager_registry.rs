//! # Manager Registry
//!
//! Thread-safe in-process container of transaction managers, addressable by
//! name, by qualifier, or as the primary/selected manager.

use super::{LookupError, ManagerContainer};
use crate::constants::defaults;
use crate::transaction::TransactionManager;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Selection hook that names the manager to use when several are registered
pub trait ManagerSelector: Send + Sync {
    fn select(&self) -> Arc<dyn TransactionManager>;
}

/// One manager entry and the ways it can be addressed
pub struct ManagerRegistration {
    name: String,
    qualifiers: Vec<String>,
    primary: bool,
    manager: Arc<dyn TransactionManager>,
}

impl ManagerRegistration {
    pub fn new(name: impl Into<String>, manager: Arc<dyn TransactionManager>) -> Self {
        Self {
            name: name.into(),
            qualifiers: Vec::new(),
            primary: false,
            manager,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifiers.push(qualifier.into());
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    fn matches_qualifier(&self, qualifier: &str) -> bool {
        self.name == qualifier || self.qualifiers.iter().any(|q| q == qualifier)
    }
}

impl fmt::Debug for ManagerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerRegistration")
            .field("name", &self.name)
            .field("qualifiers", &self.qualifiers)
            .field("primary", &self.primary)
            .finish()
    }
}

/// Registry of transaction managers
#[derive(Default)]
pub struct ManagerRegistry {
    registrations: RwLock<Vec<ManagerRegistration>>,
    selectors: RwLock<Vec<Arc<dyn ManagerSelector>>>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manager; names must be unique
    pub fn register(&self, registration: ManagerRegistration) -> Result<(), LookupError> {
        let mut registrations = self.registrations.write();
        if registrations.iter().any(|r| r.name == registration.name) {
            return Err(LookupError::Misconfigured(format!(
                "transaction manager '{}' is already registered",
                registration.name
            )));
        }
        if registration.primary && registrations.iter().any(|r| r.primary) {
            return Err(LookupError::Misconfigured(format!(
                "cannot mark '{}' primary: a primary transaction manager already exists",
                registration.name
            )));
        }

        info!(
            name = %registration.name,
            qualifiers = ?registration.qualifiers,
            primary = registration.primary,
            "Registered transaction manager"
        );
        registrations.push(registration);
        Ok(())
    }

    /// Declare a selection hook; more than one makes empty-name lookups fail
    pub fn add_selector(&self, selector: Arc<dyn ManagerSelector>) {
        self.selectors.write().push(selector);
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    fn resolve_default(&self) -> Result<Option<Arc<dyn TransactionManager>>, LookupError> {
        let registrations = self.registrations.read();

        match registrations.len() {
            0 => return Ok(None),
            1 => return Ok(Some(registrations[0].manager.clone())),
            _ => {}
        }

        let selectors = self.selectors.read();
        match selectors.len() {
            0 => {}
            1 => {
                debug!("Using manager selection hook to choose among {} managers", registrations.len());
                return Ok(Some(selectors[0].select()));
            }
            n => {
                return Err(LookupError::Misconfigured(format!(
                    "only one manager selection hook may exist, found {n}"
                )))
            }
        }

        if let Some(primary) = registrations.iter().find(|r| r.primary) {
            return Ok(Some(primary.manager.clone()));
        }

        if let Some(conventional) = registrations
            .iter()
            .find(|r| r.name == defaults::CONVENTIONAL_MANAGER_NAME)
        {
            return Ok(Some(conventional.manager.clone()));
        }

        Err(LookupError::NoUniqueManager {
            key: String::new(),
            candidates: registrations.iter().map(|r| r.name.clone()).collect(),
        })
    }
}

impl ManagerContainer for ManagerRegistry {
    fn lookup_by_qualifier(
        &self,
        qualifier: &str,
    ) -> Result<Arc<dyn TransactionManager>, LookupError> {
        let registrations = self.registrations.read();
        let matches: Vec<&ManagerRegistration> = registrations
            .iter()
            .filter(|r| r.matches_qualifier(qualifier))
            .collect();

        match matches.as_slice() {
            [] => Err(LookupError::NoSuchManager(qualifier.to_string())),
            [only] => Ok(only.manager.clone()),
            many => Err(LookupError::NoUniqueManager {
                key: qualifier.to_string(),
                candidates: many.iter().map(|r| r.name.clone()).collect(),
            }),
        }
    }

    fn lookup_by_name_or_primary(
        &self,
        name: &str,
    ) -> Result<Option<Arc<dyn TransactionManager>>, LookupError> {
        if name.is_empty() {
            return self.resolve_default();
        }

        self.registrations
            .read()
            .iter()
            .find(|r| r.name == name)
            .map(|r| Some(r.manager.clone()))
            .ok_or_else(|| LookupError::NoSuchManager(name.to_string()))
    }
}

impl fmt::Debug for ManagerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerRegistry")
            .field("registrations", &*self.registrations.read())
            .field("selectors", &self.selectors.read().len())
            .finish()
    }
}
