//! Database settings loaded from the environment
//!
//! Values come from `CASHIER_DB_*` variables (a `.env` file is read first when
//! present) and fall back to the [`DatabaseConfig`] defaults:
//!
//! | Variable                            | Default                        |
//! |-------------------------------------|--------------------------------|
//! | `CASHIER_DB_URL`                    | `postgres://localhost/cashier` |
//! | `CASHIER_DB_MAX_CONNECTIONS`        | `10`                           |
//! | `CASHIER_DB_MIN_CONNECTIONS`        | `2`                            |
//! | `CASHIER_DB_ACQUIRE_TIMEOUT_SECS`   | `30`                           |
//! | `CASHIER_DB_MAX_LIFETIME_SECS`      | `1800`                         |
//! | `CASHIER_DB_IDLE_TIMEOUT_SECS`      | `600`                          |
//! | `CASHIER_DB_STATEMENT_TIMEOUT_SECS` | unset (no limit)               |
//! | `CASHIER_DB_MIGRATE`                | `false`                        |

use serde::Deserialize;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::error::DatabaseError;
use crate::pool::DatabaseConfig;

const ENV_PREFIX: &str = "CASHIER_DB";

/// Pool settings as read from configuration sources
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "check_pool_bounds"))]
pub struct DatabaseSettings {
    #[validate(length(min = 1))]
    pub url: String,
    #[validate(range(min = 1, max = 1000))]
    pub max_connections: u32,
    pub min_connections: u32,
    #[validate(range(min = 1))]
    pub acquire_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub idle_timeout_secs: u64,
    #[validate(range(min = 1))]
    pub statement_timeout_secs: Option<u64>,
    pub migrate: bool,
}

fn check_pool_bounds(settings: &DatabaseSettings) -> Result<(), ValidationError> {
    if settings.min_connections > settings.max_connections {
        return Err(ValidationError::new("min_connections_exceeds_max"));
    }
    Ok(())
}

impl DatabaseSettings {
    /// Loads settings from `.env` and the process environment
    pub fn from_env() -> Result<Self, DatabaseError> {
        dotenvy::dotenv().ok();
        Self::load(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Loads settings from the given environment source over the defaults
    pub fn load(environment: config::Environment) -> Result<Self, DatabaseError> {
        let defaults = DatabaseConfig::default();
        let settings: DatabaseSettings = config::Config::builder()
            .set_default("url", defaults.url)
            .and_then(|b| b.set_default("max_connections", i64::from(defaults.max_connections)))
            .and_then(|b| b.set_default("min_connections", i64::from(defaults.min_connections)))
            .and_then(|b| b.set_default("acquire_timeout_secs", seconds(defaults.acquire_timeout)))
            .and_then(|b| b.set_default("max_lifetime_secs", seconds(defaults.max_lifetime)))
            .and_then(|b| b.set_default("idle_timeout_secs", seconds(defaults.idle_timeout)))
            .and_then(|b| b.set_default("migrate", defaults.migrate_on_connect))
            .map_err(|e| DatabaseError::InvalidConfiguration(e.to_string()))?
            .add_source(environment)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DatabaseError::InvalidConfiguration(e.to_string()))?;

        settings
            .validate()
            .map_err(|e| DatabaseError::InvalidConfiguration(e.to_string()))?;
        Ok(settings)
    }

    /// Converts into a pool configuration
    pub fn into_config(self) -> DatabaseConfig {
        let config = DatabaseConfig::new(self.url)
            .pool_size(self.min_connections, self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .recycle_after(
                Duration::from_secs(self.max_lifetime_secs),
                Duration::from_secs(self.idle_timeout_secs),
            )
            .migrate_on_connect(self.migrate);
        match self.statement_timeout_secs {
            Some(secs) => config.statement_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

fn seconds(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = DatabaseSettings::load(environment(&[])).unwrap();
        assert_eq!(settings.url, "postgres://localhost/cashier");
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.idle_timeout_secs, 600);
        assert_eq!(settings.statement_timeout_secs, None);
        assert!(!settings.migrate);
    }

    #[test]
    fn test_environment_overrides() {
        let settings = DatabaseSettings::load(environment(&[
            ("CASHIER_DB_URL", "postgres://db.internal/cashier"),
            ("CASHIER_DB_MAX_CONNECTIONS", "25"),
            ("CASHIER_DB_ACQUIRE_TIMEOUT_SECS", "5"),
            ("CASHIER_DB_STATEMENT_TIMEOUT_SECS", "15"),
            ("CASHIER_DB_MIGRATE", "true"),
        ]))
        .unwrap();

        let config = settings.into_config();
        assert_eq!(config.url, "postgres://db.internal/cashier");
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.statement_timeout, Some(Duration::from_secs(15)));
        assert!(config.migrate_on_connect);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let result = DatabaseSettings::load(environment(&[
            ("CASHIER_DB_MAX_CONNECTIONS", "2"),
            ("CASHIER_DB_MIN_CONNECTIONS", "5"),
        ]));
        assert!(matches!(result, Err(DatabaseError::InvalidConfiguration(_))));

        let result = DatabaseSettings::load(environment(&[("CASHIER_DB_MAX_CONNECTIONS", "0")]));
        assert!(matches!(result, Err(DatabaseError::InvalidConfiguration(_))));
    }
}
