//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the cashier data core using SQLx.
//!
//! # Architecture
//!
//! The crate implements the `GenericRepository` port from `core_kernel` once,
//! as [`PgRepository`], for every entity that provides a [`PgEntity`] table
//! mapping. Criteria are translated to parameterised SQL by the [`sql`]
//! module, so the domain layer never sees a query string.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{connect, DatabaseSettings, PgRepository};
//! use domain_cashier::{Item, ItemService};
//! use std::sync::Arc;
//!
//! let config = DatabaseSettings::from_env()?.into_config().migrate_on_connect(true);
//! let pool = connect(&config).await?;
//! let items = ItemService::new(Arc::new(PgRepository::<Item>::new(pool)));
//! ```

pub mod pool;
pub mod settings;
pub mod error;
pub mod mapping;
pub mod sql;
pub mod repositories;

pub use pool::{DatabasePool, connect, run_migrations, DatabaseConfig, APPLICATION_NAME};
pub use settings::DatabaseSettings;
pub use error::DatabaseError;
pub use mapping::PgEntity;
pub use repositories::PgRepository;
