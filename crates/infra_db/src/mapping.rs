//! Entity to table mapping
//!
//! [`PgEntity`] tells the generic repository where an entity lives and how to
//! move it between its domain type and a database row. The table's columns are
//! `id` followed by `Entity::FIELDS`, the same names the entity exposes through
//! `Entity::field`, so criteria can be translated to SQL without further
//! lookup.

use core_kernel::{DataError, Entity};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres};

use crate::error::DatabaseError;

/// An entity persisted in its own PostgreSQL table keyed by `id UUID`
pub trait PgEntity: Entity {
    /// Row shape returned by `SELECT id, <FIELDS>`
    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    /// Table name
    const TABLE: &'static str;

    /// Binds the values of `Entity::FIELDS` in order
    fn push_values(&self, values: &mut Separated<'_, 'static, Postgres, &'static str>);

    /// Rebuilds the entity from a fetched row
    fn from_row(row: Self::Row) -> Result<Self, DataError>;
}

/// Storage error for a stored value that no longer maps to the domain type
pub(crate) fn decode_error<E: Entity>(message: impl Into<String>) -> DataError {
    DataError::storage(
        format!("An error occurred while attempting to read a {} entity.", E::ENTITY_NAME),
        DatabaseError::SerializationError(message.into()),
    )
}
