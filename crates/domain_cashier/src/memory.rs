//! In-memory repository
//!
//! A [`GenericRepository`] that keeps entities in a vector in insertion order
//! and evaluates criteria directly. Useful for unit testing data services and
//! for embedding without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

use core_kernel::{
    AdapterHealth, Criteria, DataError, DomainPort, Entity, EntityId, GenericRepository,
    HealthCheckResult, HealthCheckable,
};

/// Failure raised while the store is switched offline
#[derive(Debug, Error)]
#[error("in-memory store is offline")]
pub struct StoreOffline;

/// In-memory implementation of [`GenericRepository`]
#[derive(Debug)]
pub struct InMemoryRepository<E: Entity> {
    records: RwLock<Vec<E>>,
    offline: AtomicBool,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    /// Creates an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates with entities, assigning identities where missing
    pub async fn with_records(records: Vec<E>) -> Result<Self, DataError> {
        let repository = Self::new();
        for record in records {
            repository.save(record).await?;
        }
        Ok(repository)
    }

    /// Makes every subsequent operation fail with a storage error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Inserts or replaces by identity, assigning one if missing
    fn upsert(records: &mut Vec<E>, mut entity: E) -> E {
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = E::Id::generate();
                entity.assign_id(id);
                id
            }
        };

        match records.iter_mut().find(|r| r.id() == Some(id)) {
            Some(existing) => *existing = entity.clone(),
            None => records.push(entity.clone()),
        }
        entity
    }

    fn ensure_online(&self, operation: &str) -> Result<(), DataError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DataError::storage(
                format!(
                    "An error occurred while attempting to {} {} entities.",
                    operation,
                    E::ENTITY_NAME
                ),
                StoreOffline,
            ));
        }
        Ok(())
    }
}

impl<E: Entity> DomainPort for InMemoryRepository<E> {}

#[async_trait]
impl<E: Entity> HealthCheckable for InMemoryRepository<E> {
    async fn health_check(&self) -> HealthCheckResult {
        let offline = self.offline.load(Ordering::SeqCst);
        HealthCheckResult {
            adapter_id: format!("memory-{}-repository", E::ENTITY_NAME.to_lowercase()),
            status: if offline {
                AdapterHealth::Unhealthy
            } else {
                AdapterHealth::Healthy
            },
            latency_ms: 0,
            message: offline.then(|| "store is offline".to_string()),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl<E: Entity> GenericRepository<E> for InMemoryRepository<E> {
    async fn save(&self, entity: E) -> Result<E, DataError> {
        self.ensure_online("save")?;
        entity.validate()?;

        let mut records = self.records.write().await;
        Ok(Self::upsert(&mut records, entity))
    }

    async fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>, DataError> {
        self.ensure_online("save")?;
        for entity in &entities {
            entity.validate()?;
        }

        // Nothing below can fail, so holding the lock makes the batch atomic
        let mut records = self.records.write().await;
        Ok(entities
            .into_iter()
            .map(|entity| Self::upsert(&mut records, entity))
            .collect())
    }

    async fn delete(&self, entity: &E) -> Result<(), DataError> {
        self.ensure_online("delete")?;
        let id = entity.id().ok_or_else(|| {
            DataError::storage_message(format!(
                "An error occurred while attempting to delete a {} entity: it has not been saved.",
                E::ENTITY_NAME
            ))
        })?;

        let mut records = self.records.write().await;
        let position = records.iter().position(|r| r.id() == Some(id)).ok_or_else(|| {
            DataError::storage_message(format!(
                "An error occurred while attempting to delete a {} entity: no record with id {} exists.",
                E::ENTITY_NAME,
                id
            ))
        })?;
        records.remove(position);
        Ok(())
    }

    async fn select(&self, criteria: &Criteria) -> Result<Vec<E>, DataError> {
        self.ensure_online("select")?;
        criteria.check_fields::<E>()?;
        let records = self.records.read().await;

        let mut results: Vec<E> = records
            .iter()
            .filter(|r| criteria.matches(*r))
            .cloned()
            .collect();
        criteria.sort(&mut results);

        let offset = criteria.offset.unwrap_or(0) as usize;
        let limit = criteria.limit.map_or(usize::MAX, |l| l as usize);
        Ok(results.into_iter().skip(offset).take(limit).collect())
    }

    async fn select_one(&self, criteria: &Criteria) -> Result<E, DataError> {
        self.ensure_online("select")?;
        criteria.check_fields::<E>()?;
        let records = self.records.read().await;

        let mut matches = records.iter().filter(|r| criteria.matches(*r));
        let first = matches
            .next()
            .ok_or_else(|| DataError::not_found(E::ENTITY_NAME, criteria))?;
        if matches.next().is_some() {
            return Err(DataError::ambiguous(E::ENTITY_NAME, criteria));
        }
        Ok(first.clone())
    }

    async fn count(&self, criteria: &Criteria) -> Result<u64, DataError> {
        self.ensure_online("count")?;
        criteria.check_fields::<E>()?;
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| criteria.matches(*r)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::Department;
    use core_kernel::{DepartmentId, Predicate, NAME_FIELD};

    #[tokio::test]
    async fn test_save_assigns_id_once() {
        let repository = InMemoryRepository::new();
        let saved = repository.save(Department::new("Pharmacy")).await.unwrap();
        let id = saved.id.expect("id assigned on save");

        let mut renamed = saved.clone();
        renamed.name = "Dispensary".to_string();
        let updated = repository.save(renamed).await.unwrap();

        assert_eq!(updated.id, Some(id));
        assert_eq!(repository.len().await, 1);
        assert_eq!(repository.select_by_id(id).await.unwrap().name, "Dispensary");
    }

    #[tokio::test]
    async fn test_select_by_unknown_id_is_not_found() {
        let repository = InMemoryRepository::<Department>::new();
        let err = repository.select_by_id(DepartmentId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_select_one_ambiguous() {
        let repository = InMemoryRepository::with_records(vec![
            Department::new("Lab"),
            Department::new("Lab"),
        ])
        .await
        .unwrap();
        let criteria = Criteria::new().add(Predicate::eq(NAME_FIELD, "Lab"));
        assert!(repository.select_one(&criteria).await.unwrap_err().is_ambiguous());
        assert_eq!(repository.count(&criteria).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let repository = InMemoryRepository::new();
        let saved = repository.save(Department::new("Radiology")).await.unwrap();
        repository.delete(&saved).await.unwrap();
        assert!(repository.is_empty().await);

        assert!(repository.delete(&saved).await.unwrap_err().is_storage());
        assert!(repository.delete(&Department::new("Unsaved")).await.unwrap_err().is_storage());
    }

    #[tokio::test]
    async fn test_save_all_assigns_ids_in_order() {
        let repository = InMemoryRepository::new();
        let existing = repository.save(Department::new("Pharmacy")).await.unwrap();
        let mut renamed = existing.clone();
        renamed.name = "Dispensary".to_string();

        let saved = repository
            .save_all(vec![renamed, Department::new("Radiology")])
            .await
            .unwrap();

        assert_eq!(saved[0].id, existing.id);
        assert_eq!(saved[1].name, "Radiology");
        assert!(saved[1].id.is_some());
        assert_eq!(repository.len().await, 2);
    }

    #[tokio::test]
    async fn test_save_all_writes_nothing_when_one_is_invalid() {
        let repository = InMemoryRepository::new();
        let batch = vec![Department::new("Pharmacy"), Department::new("x".repeat(256))];

        let err = repository.save_all(batch).await.unwrap_err();

        assert!(err.is_invalid_argument());
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_column_is_rejected() {
        let repository = InMemoryRepository::with_records(vec![Department::new("Lab")])
            .await
            .unwrap();
        let criteria = Criteria::new().add(Predicate::eq("price", "1"));

        assert!(repository.select(&criteria).await.unwrap_err().is_invalid_argument());
        assert!(repository.select_one(&criteria).await.unwrap_err().is_invalid_argument());
        assert!(repository.count(&criteria).await.unwrap_err().is_invalid_argument());

        let empty = InMemoryRepository::<Department>::new();
        assert!(empty.select_one(&criteria).await.unwrap_err().is_invalid_argument());
    }

    #[tokio::test]
    async fn test_offline_wraps_failures() {
        let repository = InMemoryRepository::<Department>::new();
        repository.set_offline(true);

        let err = repository.select(&Criteria::new()).await.unwrap_err();
        assert!(err.is_storage());
        assert!(err.to_string().contains("Department"));
        assert_eq!(repository.health_check().await.status, AdapterHealth::Unhealthy);

        repository.set_offline(false);
        assert_eq!(repository.health_check().await.status, AdapterHealth::Healthy);
    }
}
