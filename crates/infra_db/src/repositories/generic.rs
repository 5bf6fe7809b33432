//! PostgreSQL generic repository
//!
//! [`PgRepository`] implements `GenericRepository` once for every
//! [`PgEntity`]. Writes run in their own transaction; reads use the pool
//! directly. Every database failure is reported as `DataError::Storage` with
//! the classified [`DatabaseError`] as its source.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use std::marker::PhantomData;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, Criteria, DataError, DomainPort, EntityId, GenericRepository,
    HealthCheckResult, HealthCheckable,
};

use crate::error::DatabaseError;
use crate::mapping::PgEntity;
use crate::sql;

/// Repository for one entity type backed by its PostgreSQL table
pub struct PgRepository<E: PgEntity> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: PgEntity> PgRepository<E> {
    /// Creates a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn upsert(tx: &mut Transaction<'_, Postgres>, entity: &E) -> Result<E::Row, DataError> {
        let id: Uuid = entity.id().unwrap_or_else(E::Id::generate).into();
        let row = sql::upsert(id, entity)
            .build_query_as::<E::Row>()
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| Self::storage_error("save", e))?;

        debug!(%id, "row upserted");
        Ok(row)
    }

    fn storage_error(operation: &str, error: sqlx::Error) -> DataError {
        DataError::storage(
            format!(
                "An error occurred while attempting to {} a {} entity.",
                operation,
                E::ENTITY_NAME
            ),
            DatabaseError::from(&error),
        )
    }
}

impl<E: PgEntity> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<E: PgEntity> std::fmt::Debug for PgRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgRepository")
            .field("table", &E::TABLE)
            .finish()
    }
}

impl<E: PgEntity> DomainPort for PgRepository<E> {}

#[async_trait]
impl<E: PgEntity> HealthCheckable for PgRepository<E> {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;
        let adapter_id = format!("postgres-{}-repository", E::TABLE);

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id,
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id,
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl<E: PgEntity> GenericRepository<E> for PgRepository<E> {
    #[instrument(skip_all, fields(table = E::TABLE))]
    async fn save(&self, entity: E) -> Result<E, DataError> {
        entity.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::storage_error("save", e))?;

        let row = Self::upsert(&mut tx, &entity).await?;

        tx.commit().await.map_err(|e| Self::storage_error("save", e))?;
        E::from_row(row)
    }

    #[instrument(skip_all, fields(table = E::TABLE, count = entities.len()))]
    async fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>, DataError> {
        for entity in &entities {
            entity.validate()?;
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::storage_error("save", e))?;

        // Dropping the transaction on an early return rolls every row back
        let mut rows = Vec::with_capacity(entities.len());
        for entity in &entities {
            rows.push(Self::upsert(&mut tx, entity).await?);
        }

        tx.commit().await.map_err(|e| Self::storage_error("save", e))?;
        rows.into_iter().map(E::from_row).collect()
    }

    #[instrument(skip_all, fields(table = E::TABLE))]
    async fn delete(&self, entity: &E) -> Result<(), DataError> {
        let id = entity.id().ok_or_else(|| {
            DataError::storage_message(format!(
                "An error occurred while attempting to delete a {} entity: it has not been saved.",
                E::ENTITY_NAME
            ))
        })?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::storage_error("delete", e))?;

        let result = sql::delete::<E>(id.into())
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::storage_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(DataError::storage(
                format!(
                    "An error occurred while attempting to delete a {} entity: no record with id {} exists.",
                    E::ENTITY_NAME,
                    id
                ),
                DatabaseError::NotFound(id.to_string()),
            ));
        }

        tx.commit().await.map_err(|e| Self::storage_error("delete", e))?;
        debug!(%id, "row deleted");
        Ok(())
    }

    #[instrument(skip_all, fields(table = E::TABLE, criteria = %criteria))]
    async fn select(&self, criteria: &Criteria) -> Result<Vec<E>, DataError> {
        let rows = sql::select::<E>(criteria)?
            .build_query_as::<E::Row>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::storage_error("select", e))?;

        debug!(rows = rows.len(), "rows selected");
        rows.into_iter().map(E::from_row).collect()
    }

    #[instrument(skip_all, fields(table = E::TABLE, criteria = %criteria))]
    async fn select_one(&self, criteria: &Criteria) -> Result<E, DataError> {
        // Two rows are enough to tell a unique match from an ambiguous one
        let window = criteria.filter_only().window(0, 2);
        let mut rows = sql::select::<E>(&window)?
            .build_query_as::<E::Row>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::storage_error("select", e))?;

        match rows.len() {
            0 => Err(DataError::not_found(E::ENTITY_NAME, criteria)),
            1 => E::from_row(rows.remove(0)),
            _ => Err(DataError::ambiguous(E::ENTITY_NAME, criteria)),
        }
    }

    #[instrument(skip_all, fields(table = E::TABLE, criteria = %criteria))]
    async fn count(&self, criteria: &Criteria) -> Result<u64, DataError> {
        let total: i64 = sql::count::<E>(&criteria.filter_only())?
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::storage_error("count", e))?;

        Ok(u64::try_from(total).unwrap_or_default())
    }
}
