//! Generic data service
//!
//! One [`DataService`] is instantiated per entity type over a repository bound
//! to that type. The service validates arguments, owns the void/unvoid state
//! machine and applies the voided filter and paging to every listing.
//!
//! Optional arguments are modelled with `Option` so that absent values coming
//! from callers are reported as `NullReference` (objects) or
//! `InvalidArgument` (strings) instead of being defaulted.

use std::sync::Arc;

use core_kernel::{
    storage_timestamp, Criteria, DataError, GenericRepository, Named, PagingInfo, Predicate,
    Voidable, NAME_FIELD, VOIDED_FIELD,
};
use tracing::{debug, info, instrument};

use crate::bill::Bill;
use crate::department::Department;
use crate::item::Item;

/// Longest name fragment accepted by name searches, in characters
pub const MAX_NAME_LENGTH: usize = 255;

pub type DepartmentService = DataService<Department>;
pub type ItemService = DataService<Item>;
pub type BillService = DataService<Bill>;

/// Business operations for one voidable entity type
pub struct DataService<E: Voidable> {
    repository: Arc<dyn GenericRepository<E>>,
}

impl<E: Voidable> Clone for DataService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<E: Voidable> DataService<E> {
    /// Creates a service over the given repository
    pub fn new(repository: Arc<dyn GenericRepository<E>>) -> Self {
        Self { repository }
    }

    /// Returns the underlying repository
    pub fn repository(&self) -> &Arc<dyn GenericRepository<E>> {
        &self.repository
    }

    /// Saves a new or changed entity
    ///
    /// # Errors
    ///
    /// `NullReference` if no entity is supplied; `Storage` if the save fails
    #[instrument(skip_all, fields(entity_type = E::ENTITY_NAME))]
    pub async fn save(&self, entity: Option<E>) -> Result<E, DataError> {
        let entity = entity.ok_or_else(|| DataError::null_reference("entity"))?;
        let saved = self.repository.save(entity).await?;
        debug!(id = ?saved.id(), "entity saved");
        Ok(saved)
    }

    /// Physically deletes an entity
    ///
    /// Prefer [`DataService::void_entity`]; purging leaves no audit trail.
    #[instrument(skip_all, fields(entity_type = E::ENTITY_NAME))]
    pub async fn purge(&self, entity: Option<E>) -> Result<(), DataError> {
        let entity = entity.ok_or_else(|| DataError::null_reference("entity"))?;
        self.repository.delete(&entity).await?;
        info!(id = ?entity.id(), "entity purged");
        Ok(())
    }

    /// Fetches an entity by identity
    #[instrument(skip(self), fields(entity_type = E::ENTITY_NAME))]
    pub async fn get_by_id(&self, id: E::Id) -> Result<E, DataError> {
        self.repository.select_by_id(id).await
    }

    /// Voids an entity, removing it from circulation
    ///
    /// Voiding an already-voided entity is accepted and replaces the reason.
    ///
    /// # Errors
    ///
    /// `NullReference` if no entity is supplied, then `InvalidArgument` if the
    /// reason is absent or empty
    #[instrument(skip_all, fields(entity_type = E::ENTITY_NAME))]
    pub async fn void_entity(&self, entity: Option<E>, reason: Option<&str>) -> Result<E, DataError> {
        let mut entity = entity.ok_or_else(|| DataError::null_reference("entity"))?;
        let reason = match reason {
            None => return Err(DataError::invalid_argument("reason", "a void reason is required")),
            Some("") => {
                return Err(DataError::invalid_argument("reason", "the void reason must not be empty"))
            }
            Some(reason) => reason,
        };

        entity.void_state_mut().void(reason, storage_timestamp());
        let entity = self.repository.save(entity).await?;
        info!(id = ?entity.id(), reason, "entity voided");
        Ok(entity)
    }

    /// Returns a voided entity to circulation
    ///
    /// The void reason and date are cleared.
    ///
    /// # Errors
    ///
    /// `NullReference` if no entity is supplied
    #[instrument(skip_all, fields(entity_type = E::ENTITY_NAME))]
    pub async fn unvoid_entity(&self, entity: Option<E>) -> Result<E, DataError> {
        let mut entity = entity.ok_or_else(|| DataError::null_reference("entity"))?;

        entity.void_state_mut().unvoid();
        let entity = self.repository.save(entity).await?;
        info!(id = ?entity.id(), "entity unvoided");
        Ok(entity)
    }

    /// Returns all entities, excluding voided ones unless `include_voided`
    pub async fn get_all(&self, include_voided: bool) -> Result<Vec<E>, DataError> {
        self.execute(Self::voided_filter(include_voided), None).await
    }

    /// Returns one page of [`DataService::get_all`]
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the paging bounds are invalid
    pub async fn get_all_paged(
        &self,
        include_voided: bool,
        paging: &mut PagingInfo,
    ) -> Result<Vec<E>, DataError> {
        self.execute(Self::voided_filter(include_voided), Some(paging)).await
    }

    /// Criteria that exclude voided entities unless they are wanted
    pub(crate) fn voided_filter(include_voided: bool) -> Criteria {
        let criteria = Criteria::new();
        if include_voided {
            criteria
        } else {
            criteria.add(Predicate::eq(VOIDED_FIELD, false))
        }
    }

    /// Runs a listing query, loading the total and applying the page window
    /// when paging is requested
    #[instrument(skip_all, fields(entity_type = E::ENTITY_NAME, criteria = %criteria))]
    pub(crate) async fn execute(
        &self,
        criteria: Criteria,
        paging: Option<&mut PagingInfo>,
    ) -> Result<Vec<E>, DataError> {
        let Some(paging) = paging else {
            return self.repository.select(&criteria).await;
        };

        paging.validate()?;
        if paging.load_record_count {
            let total = self.repository.count(&criteria).await?;
            paging.total_record_count = Some(total);
            paging.load_record_count = false;
        }

        let criteria = criteria.window(paging.offset(), u64::from(paging.page_size));
        let results = self.repository.select(&criteria).await?;
        debug!(page = paging.page, returned = results.len(), "page loaded");
        Ok(results)
    }
}

impl<E: Voidable + Named> DataService<E> {
    /// Finds entities whose name starts with the fragment, ignoring case
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the fragment is absent, empty, or longer than
    /// [`MAX_NAME_LENGTH`] characters, checked in that order
    pub async fn find_by_name(
        &self,
        name_fragment: Option<&str>,
        include_voided: bool,
    ) -> Result<Vec<E>, DataError> {
        let criteria = Self::name_criteria(name_fragment, include_voided)?;
        self.execute(criteria, None).await
    }

    /// Returns one page of [`DataService::find_by_name`]
    pub async fn find_by_name_paged(
        &self,
        name_fragment: Option<&str>,
        include_voided: bool,
        paging: &mut PagingInfo,
    ) -> Result<Vec<E>, DataError> {
        let criteria = Self::name_criteria(name_fragment, include_voided)?;
        self.execute(criteria, Some(paging)).await
    }

    fn name_criteria(name_fragment: Option<&str>, include_voided: bool) -> Result<Criteria, DataError> {
        let fragment = validate_name_fragment("name_fragment", name_fragment)?;
        Ok(Self::voided_filter(include_voided)
            .add(Predicate::starts_with_ignore_case(NAME_FIELD, fragment)))
    }
}

/// Checks a caller-supplied search string
///
/// Absent, empty and oversized values each produce a distinct message.
pub(crate) fn validate_name_fragment<'a>(
    argument: &str,
    value: Option<&'a str>,
) -> Result<&'a str, DataError> {
    let value = value.ok_or_else(|| DataError::invalid_argument(argument, "the value must be supplied"))?;
    if value.is_empty() {
        return Err(DataError::invalid_argument(argument, "the value must not be empty"));
    }
    let length = value.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(DataError::invalid_argument(
            argument,
            format!(
                "the value must be at most {} characters but was {}",
                MAX_NAME_LENGTH, length
            ),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(error: DataError) -> String {
        match error {
            DataError::InvalidArgument { message, .. } => message,
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_name_fragment_order() {
        assert!(message(validate_name_fragment("name", None).unwrap_err()).contains("supplied"));
        assert!(message(validate_name_fragment("name", Some("")).unwrap_err()).contains("empty"));

        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(message(validate_name_fragment("name", Some(&long)).unwrap_err()).contains("at most"));
    }

    #[test]
    fn test_validate_name_fragment_counts_characters() {
        let accented = "é".repeat(MAX_NAME_LENGTH);
        assert!(accented.len() > MAX_NAME_LENGTH);
        assert_eq!(validate_name_fragment("name", Some(&accented)).unwrap(), accented);
    }

    #[test]
    fn test_voided_filter() {
        assert!(DataService::<Item>::voided_filter(true).predicates.is_empty());
        assert_eq!(
            DataService::<Item>::voided_filter(false).predicates,
            vec![Predicate::eq(VOIDED_FIELD, false)]
        );
    }
}
