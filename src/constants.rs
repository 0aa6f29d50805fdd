//! # System Constants
//!
//! Documented defaults and operation names that define the operational
//! boundaries of the transactional test lifecycle.
//!
//! Every built-in default lives here exactly once; configuration defaults and
//! the class-level configuration fallback both read from these values.

/// Built-in defaults applied when a test class declares no transaction configuration
pub mod defaults {
    /// Default transaction manager name. Empty means "resolve the unique or primary manager".
    pub const TRANSACTION_MANAGER_NAME: &str = "";

    /// Default rollback flag for transactions opened around a test method
    pub const DEFAULT_ROLLBACK: bool = true;

    /// Whether an unresolvable transaction manager fails the test instead of
    /// silently running it without a transaction
    pub const STRICT_MANAGER_RESOLUTION: bool = false;

    /// Conventional name tried when several managers are registered and none is
    /// primary or selected by a selection hook
    pub const CONVENTIONAL_MANAGER_NAME: &str = "transactionManager";
}

/// Lifecycle operation names used in structured log events
pub mod events {
    pub const BEFORE_TEST: &str = "lifecycle.before_test";
    pub const AFTER_TEST: &str = "lifecycle.after_test";

    pub const TRANSACTION_STARTED: &str = "transaction.started";
    pub const TRANSACTION_COMMITTED: &str = "transaction.committed";
    pub const TRANSACTION_ROLLED_BACK: &str = "transaction.rolled_back";
    pub const TRANSACTION_SKIPPED: &str = "transaction.skipped";

    pub const BEFORE_TRANSACTION_HOOK: &str = "hook.before_transaction";
    pub const AFTER_TRANSACTION_HOOK: &str = "hook.after_transaction";
}

/// Environment and file conventions
pub mod system {
    /// Prefix for environment variable overrides (e.g. `TXTEST_DEFAULT_ROLLBACK`)
    pub const ENV_PREFIX: &str = "TXTEST";

    /// Environment variable naming the running environment
    pub const ENV_VARIABLE: &str = "TXTEST_ENV";

    /// Environment variable selecting the log output format (`json` or `pretty`)
    pub const LOG_FORMAT_VARIABLE: &str = "TXTEST_LOG_FORMAT";

    /// Optional configuration file looked up in the working directory
    pub const CONFIG_FILE_NAME: &str = "txtest.toml";
}
