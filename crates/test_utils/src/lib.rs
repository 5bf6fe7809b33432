//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! cashier data core test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for departments, items and bills
//! - `builders`: Builder patterns for test data construction
//! - `database`: PostgreSQL container management
//! - `assertions`: Assertion helpers for data errors and listings
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;

use once_cell::sync::Lazy;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Another harness may already own the global subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
});

/// Installs a test-friendly tracing subscriber once per process
///
/// The filter is read from `RUST_LOG` and defaults to `warn`.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
