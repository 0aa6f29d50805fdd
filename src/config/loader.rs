//! Configuration Loader
//!
//! Layers built-in defaults, an optional TOML file and `TXTEST_*` environment
//! variables using the `config` crate.

use super::error::{ConfigResult, ConfigurationError};
use super::ListenerConfig;
use crate::constants::{defaults, system};
use config::{Config, Environment, File};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Builder over the configuration sources
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    environment: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit file; unlike the working-directory file it must exist
    pub fn with_file(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read overrides from the given map instead of the process environment
    pub fn with_environment(mut self, vars: HashMap<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    pub fn load(self) -> ConfigResult<ListenerConfig> {
        let mut builder = Config::builder()
            .set_default(
                "strict_manager_resolution",
                defaults::STRICT_MANAGER_RESOLUTION,
            )
            .and_then(|b| b.set_default("default_rollback", defaults::DEFAULT_ROLLBACK))
            .and_then(|b| {
                b.set_default(
                    "default_transaction_manager",
                    defaults::TRANSACTION_MANAGER_NAME,
                )
            })
            .map_err(|e| ConfigurationError::load_error("defaults", e))?;

        builder = match &self.file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigurationError::ConfigFileNotFound { path: path.clone() });
                }
                debug!("Loading listener configuration from {}", path.display());
                builder.add_source(File::from(path.as_path()).required(true))
            }
            None => builder.add_source(File::with_name(system::CONFIG_FILE_NAME).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(system::ENV_PREFIX)
                .try_parsing(true)
                .source(self.environment),
        );

        let config: ListenerConfig = builder
            .build()
            .and_then(|c| c.try_deserialize::<ListenerConfig>())
            .map_err(|e| {
                let source_name = self
                    .file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| system::CONFIG_FILE_NAME.to_string());
                ConfigurationError::load_error(source_name, e)
            })?;

        config.validate()?;

        debug!(
            strict_manager_resolution = config.strict_manager_resolution,
            default_rollback = config.default_rollback,
            default_transaction_manager = %config.default_transaction_manager,
            "Listener configuration loaded"
        );

        Ok(config)
    }
}
