//! Departments group billable items

use core_kernel::entity::{DATE_VOIDED_FIELD, VOID_REASON_FIELD};
use core_kernel::{
    DataError, DepartmentId, Entity, FieldValue, Named, SortOrder, Voidable, VoidState, ID_FIELD,
    NAME_FIELD, VOIDED_FIELD,
};
use serde::{Deserialize, Serialize};

use crate::rules::check_name;

/// Column holding the free-text description of departments and items
pub const DESCRIPTION_FIELD: &str = "description";

/// A department of the facility (pharmacy, laboratory, radiology, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: Option<DepartmentId>,
    pub name: String,
    pub description: Option<String>,
    pub void_state: VoidState,
}

impl Department {
    /// Creates a new, unsaved department
    ///
    /// The name is checked when the department is saved.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            void_state: VoidState::active(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Entity for Department {
    type Id = DepartmentId;
    const ENTITY_NAME: &'static str = "Department";
    const FIELDS: &'static [&'static str] = &[
        NAME_FIELD,
        DESCRIPTION_FIELD,
        VOIDED_FIELD,
        VOID_REASON_FIELD,
        DATE_VOIDED_FIELD,
    ];

    fn id(&self) -> Option<DepartmentId> {
        self.id
    }

    fn assign_id(&mut self, id: DepartmentId) {
        self.id = Some(id);
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            ID_FIELD => Some(self.id.into()),
            NAME_FIELD => Some(self.name.as_str().into()),
            DESCRIPTION_FIELD => Some(self.description.clone().into()),
            _ => self.void_state.field(name),
        }
    }

    /// Departments list alphabetically
    fn default_order() -> Vec<SortOrder> {
        vec![SortOrder::asc(NAME_FIELD).ignore_case(), SortOrder::asc(ID_FIELD)]
    }

    fn validate(&self) -> Result<(), DataError> {
        check_name(&self.name).map_err(DataError::from)
    }
}

impl Voidable for Department {
    fn void_state(&self) -> &VoidState {
        &self.void_state
    }

    fn void_state_mut(&mut self) -> &mut VoidState {
        &mut self.void_state
    }
}

impl Named for Department {
    fn name(&self) -> &str {
        &self.name
    }
}
