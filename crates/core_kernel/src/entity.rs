//! Entity capability traits
//!
//! Repositories and data services are written once against these traits and
//! instantiated per concrete entity type. An entity exposes its persisted
//! fields by column name so that criteria can be evaluated by any adapter
//! without the adapter knowing the entity's shape.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

use crate::criteria::{FieldValue, SortOrder};
use crate::error::DataError;

/// Column holding the surrogate identity
pub const ID_FIELD: &str = "id";
/// Column holding the soft-delete flag
pub const VOIDED_FIELD: &str = "voided";
/// Column holding the void reason
pub const VOID_REASON_FIELD: &str = "void_reason";
/// Column holding the void timestamp
pub const DATE_VOIDED_FIELD: &str = "date_voided";
/// Column searched by name lookups
pub const NAME_FIELD: &str = "name";

/// Current time at the precision stores keep (microseconds)
///
/// Timestamps written to entities go through this so that a saved entity
/// compares equal to the one read back.
pub fn storage_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Identity type of an entity
///
/// Identities are UUID-backed newtypes; `generate` is called exactly once per
/// entity, by the repository on first save.
pub trait EntityId:
    Copy + Eq + Hash + Ord + fmt::Display + fmt::Debug + Send + Sync + 'static + From<Uuid> + Into<Uuid>
{
    /// Creates a fresh, never-before-used identity
    fn generate() -> Self;
}

/// A persisted domain record
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// The identity type
    type Id: EntityId;

    /// Human-readable entity type name used in errors and logs
    const ENTITY_NAME: &'static str;

    /// Every persisted field except the identity, in storage order
    const FIELDS: &'static [&'static str];

    /// Returns the identity, or `None` if the entity has never been saved
    fn id(&self) -> Option<Self::Id>;

    /// Assigns the identity. Only repositories call this.
    fn assign_id(&mut self, id: Self::Id);

    /// Returns the value of a persisted field by column name
    ///
    /// Returns `None` for columns the entity does not have.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Whether criteria may reference the field
    fn has_field(name: &str) -> bool {
        name == ID_FIELD || Self::FIELDS.contains(&name)
    }

    /// The stable ordering used when a query does not specify one
    ///
    /// Defaults to creation order.
    fn default_order() -> Vec<SortOrder> {
        vec![SortOrder::asc(ID_FIELD)]
    }

    /// Checks the entity's own rules before it is written
    ///
    /// Repositories call this on every save so that all stores reject the
    /// same records.
    fn validate(&self) -> Result<(), DataError> {
        Ok(())
    }
}

/// Soft-delete state carried by every voidable entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidState {
    pub voided: bool,
    pub void_reason: Option<String>,
    pub date_voided: Option<DateTime<Utc>>,
}

impl VoidState {
    /// Creates an active (not voided) state
    pub fn active() -> Self {
        Self::default()
    }

    /// Marks the state voided with the given reason
    ///
    /// Re-voiding replaces the previous reason and timestamp.
    pub fn void(&mut self, reason: impl Into<String>, at: DateTime<Utc>) {
        self.voided = true;
        self.void_reason = Some(reason.into());
        self.date_voided = Some(at);
    }

    /// Returns the state to active, clearing the reason and timestamp
    pub fn unvoid(&mut self) {
        self.voided = false;
        self.void_reason = None;
        self.date_voided = None;
    }

    /// Field lookup for the void columns
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            VOIDED_FIELD => Some(FieldValue::Bool(self.voided)),
            VOID_REASON_FIELD => Some(self.void_reason.clone().into()),
            DATE_VOIDED_FIELD => Some(self.date_voided.into()),
            _ => None,
        }
    }
}

/// An entity that supports soft-delete
pub trait Voidable: Entity {
    fn void_state(&self) -> &VoidState;

    fn void_state_mut(&mut self) -> &mut VoidState;

    fn is_voided(&self) -> bool {
        self.void_state().voided
    }

    fn void_reason(&self) -> Option<&str> {
        self.void_state().void_reason.as_deref()
    }
}

/// An entity that can be searched by name
pub trait Named: Entity {
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_then_unvoid_clears_reason() {
        let mut state = VoidState::active();
        state.void("duplicate", Utc::now());
        assert!(state.voided);
        assert_eq!(state.void_reason.as_deref(), Some("duplicate"));
        assert!(state.date_voided.is_some());

        state.unvoid();
        assert_eq!(state, VoidState::active());
    }

    #[test]
    fn test_revoid_replaces_reason() {
        let mut state = VoidState::active();
        state.void("first", Utc::now());
        state.void("second", Utc::now());
        assert_eq!(state.void_reason.as_deref(), Some("second"));
    }

    #[test]
    fn test_void_fields() {
        let state = VoidState::active();
        assert_eq!(state.field(VOIDED_FIELD), Some(FieldValue::Bool(false)));
        assert_eq!(state.field(VOID_REASON_FIELD), Some(FieldValue::Null));
        assert_eq!(state.field("name"), None);
    }
}
