//! # Listener Configuration
//!
//! Settings that govern how the lifecycle controller behaves across all test
//! classes: the built-in defaults used when a class declares no transaction
//! configuration, and whether an unresolvable transaction manager is an error.
//!
//! ## Sources
//!
//! Layered lowest to highest precedence:
//!
//! 1. Built-in defaults from [`crate::constants::defaults`]
//! 2. Optional `txtest.toml` in the working directory (or an explicit file)
//! 3. `TXTEST_*` environment variables
//!
//! ```rust,no_run
//! use txtest_core::config::ListenerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ListenerConfig::load()?;
//! assert!(!config.default_transaction_manager.contains(' '));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::defaults;
use serde::{Deserialize, Serialize};

pub use error::{ConfigResult, ConfigurationError};

/// Controller-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListenerConfig {
    /// Fail a transactional test whose transaction manager cannot be resolved
    /// instead of running it without a transaction
    #[serde(default = "default_strict_manager_resolution")]
    pub strict_manager_resolution: bool,

    /// Rollback flag used for classes without their own configuration
    #[serde(default = "default_rollback")]
    pub default_rollback: bool,

    /// Manager name used for classes without their own configuration
    #[serde(default = "default_transaction_manager")]
    pub default_transaction_manager: String,
}

fn default_strict_manager_resolution() -> bool {
    defaults::STRICT_MANAGER_RESOLUTION
}

fn default_rollback() -> bool {
    defaults::DEFAULT_ROLLBACK
}

fn default_transaction_manager() -> String {
    defaults::TRANSACTION_MANAGER_NAME.to_string()
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            strict_manager_resolution: default_strict_manager_resolution(),
            default_rollback: default_rollback(),
            default_transaction_manager: default_transaction_manager(),
        }
    }
}

impl ListenerConfig {
    /// Load from the working-directory file (if any) and the process environment
    pub fn load() -> ConfigResult<Self> {
        loader::ConfigLoader::new().load()
    }

    /// Load from an explicit file plus the process environment
    pub fn load_from(path: impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        loader::ConfigLoader::new().with_file(path).load()
    }

    /// Strict mode as a builder-style toggle, mostly for tests and embedders
    pub fn with_strict_manager_resolution(mut self, strict: bool) -> Self {
        self.strict_manager_resolution = strict;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let name = &self.default_transaction_manager;
        if name.trim() != name {
            return Err(ConfigurationError::invalid_value(
                "default_transaction_manager",
                name.clone(),
                "manager names must not carry surrounding whitespace",
            ));
        }
        Ok(())
    }
}
