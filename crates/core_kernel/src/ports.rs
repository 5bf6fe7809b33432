//! Ports and Adapters Infrastructure
//!
//! This module defines the storage-facing port that every data service is
//! written against, together with the marker and health-check traits shared by
//! all adapters.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          DataService<E> (validation,         │
//! │          void/unvoid state machine)          │
//! └─────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌─────────────────────────────────────────────┐
//! │           GenericRepository<E> port          │
//! └─────────────────────────────────────────────┘
//!              ▲                       ▲
//!     ┌────────┴────────┐     ┌────────┴────────┐
//!     │ PgRepository<E> │     │ InMemory-       │
//!     │  (PostgreSQL)   │     │ Repository<E>   │
//!     └─────────────────┘     └─────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::criteria::Criteria;
use crate::entity::Entity;
use crate::error::DataError;

/// Marker trait for all ports
///
/// Ports must be thread-safe so they can be shared behind `Arc` in async
/// services.
pub trait DomainPort: Send + Sync + 'static {}

/// Uniform storage access for one entity type
///
/// Implementations wrap every engine failure into `DataError::Storage` with a
/// message naming the operation and entity type.
#[async_trait]
pub trait GenericRepository<E: Entity>: DomainPort + HealthCheckable {
    /// Inserts or updates the entity, assigning its identity on first save
    async fn save(&self, entity: E) -> Result<E, DataError>;

    /// Saves several entities as one unit of work
    ///
    /// Either every entity is written or none is. Results come back in input
    /// order.
    async fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>, DataError>;

    /// Physically removes the entity's record
    async fn delete(&self, entity: &E) -> Result<(), DataError>;

    /// Fetches exactly one record by identity
    ///
    /// # Errors
    ///
    /// `NotFound` if no record has the id, `AmbiguousResult` if several do.
    async fn select_by_id(&self, id: E::Id) -> Result<E, DataError> {
        self.select_one(&Criteria::by_id(id)).await
    }

    /// Returns all records matching the criteria, ordered and windowed
    async fn select(&self, criteria: &Criteria) -> Result<Vec<E>, DataError>;

    /// Returns the single record matching the criteria
    async fn select_one(&self, criteria: &Criteria) -> Result<E, DataError>;

    /// Counts the records matching the criteria's filter
    ///
    /// Ordering and window are ignored.
    async fn count(&self, criteria: &Criteria) -> Result<u64, DataError>;
}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    /// Adapter is healthy and operational
    Healthy,
    /// Adapter is degraded but operational
    Degraded,
    /// Adapter is unhealthy and not operational
    Unhealthy,
    /// Health status is unknown
    Unknown,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Latency of the health check in milliseconds
    pub latency_ms: u64,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

/// Trait for adapters that support health checks
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Performs a health check on the adapter
    async fn health_check(&self) -> HealthCheckResult;
}
