//! Connection pool for the cashier database
//!
//! [`connect`] turns a [`DatabaseConfig`] into a ready pool: the URL is parsed
//! into typed connect options, every session is tagged with the application
//! name and optional statement timeout, and the embedded schema migrations can
//! be applied before the pool is handed out.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

use crate::error::DatabaseError;

/// Type alias for the PostgreSQL connection pool
pub type DatabasePool = PgPool;

/// Name reported in `pg_stat_activity` for cashier sessions
pub const APPLICATION_NAME: &str = "cashier-core";

/// How to reach and size the cashier database
///
/// ```rust
/// use infra_db::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("postgres://localhost/cashier")
///     .pool_size(2, 20)
///     .statement_timeout(Duration::from_secs(5))
///     .migrate_on_connect(true);
/// assert_eq!(config.max_connections, 20);
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// How long a caller waits for a free connection
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
    /// Server-side limit on each statement; none by default
    pub statement_timeout: Option<Duration>,
    /// Apply pending schema migrations when the pool is created
    pub migrate_on_connect: bool,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            min_connections: 2,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(30 * 60),
            idle_timeout: Duration::from_secs(10 * 60),
            statement_timeout: None,
            migrate_on_connect: false,
        }
    }

    pub fn pool_size(mut self, min: u32, max: u32) -> Self {
        self.min_connections = min;
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Sets how long connections live in total and while idle
    pub fn recycle_after(mut self, lifetime: Duration, idle: Duration) -> Self {
        self.max_lifetime = lifetime;
        self.idle_timeout = idle;
        self
    }

    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    pub fn migrate_on_connect(mut self, migrate: bool) -> Self {
        self.migrate_on_connect = migrate;
        self
    }

    /// Parses the URL and applies the per-session options
    ///
    /// # Errors
    ///
    /// `DatabaseError::InvalidConfiguration` if the URL cannot be parsed or
    /// the pool bounds are inconsistent
    pub fn connect_options(&self) -> Result<PgConnectOptions, DatabaseError> {
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(DatabaseError::InvalidConfiguration(format!(
                "pool size must satisfy 0 <= min ({}) <= max ({}) and max > 0",
                self.min_connections, self.max_connections
            )));
        }

        let mut options = PgConnectOptions::from_str(&self.url)
            .map_err(|e| DatabaseError::InvalidConfiguration(format!("database url: {}", e)))?
            .application_name(APPLICATION_NAME);
        if let Some(timeout) = self.statement_timeout {
            options = options.options([("statement_timeout", timeout.as_millis().to_string())]);
        }
        Ok(options)
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .max_lifetime(self.max_lifetime)
            .idle_timeout(self.idle_timeout)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("postgres://localhost/cashier")
    }
}

/// Opens the pool, applying migrations first when configured to
///
/// # Errors
///
/// `InvalidConfiguration` for a bad URL or pool size, `ConnectionFailed` if
/// the server cannot be reached, `MigrationFailed` if the schema cannot be
/// brought up to date
#[instrument(skip_all)]
pub async fn connect(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let options = config.connect_options()?;
    // Host and database only; the URL may carry credentials
    let host = options.get_host().to_string();
    let database = options.get_database().unwrap_or_default().to_string();

    let pool = config
        .pool_options()
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(format!("{}/{}: {}", host, database, e)))?;
    info!(
        %host,
        %database,
        min_connections = config.min_connections,
        max_connections = config.max_connections,
        "database pool opened"
    );

    if config.migrate_on_connect {
        run_migrations(&pool).await?;
    }
    Ok(pool)
}

/// Applies the cashier schema migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}
