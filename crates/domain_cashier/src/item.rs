//! Billable items

use core_kernel::entity::{DATE_VOIDED_FIELD, VOID_REASON_FIELD};
use core_kernel::{
    DataError, DepartmentId, Entity, FieldValue, ItemId, Named, SortOrder, Voidable, VoidState,
    ID_FIELD, NAME_FIELD, VOIDED_FIELD,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::department::DESCRIPTION_FIELD;
use crate::error::CashierError;
use crate::rules::{check_amount, check_name};

pub const DEPARTMENT_ID_FIELD: &str = "department_id";
pub const PRICE_FIELD: &str = "price";

/// Something the cashier can put on a bill: a drug, a test, a procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<ItemId>,
    pub name: String,
    pub description: Option<String>,
    pub department_id: DepartmentId,
    pub price: Decimal,
    pub void_state: VoidState,
}

impl Item {
    /// Creates a new, unsaved item
    ///
    /// # Errors
    ///
    /// Returns `CashierError::NameTooLong` for names over 255 characters, and
    /// an amount error if the price is negative or does not fit the stored
    /// precision
    pub fn new(
        name: impl Into<String>,
        department_id: DepartmentId,
        price: Decimal,
    ) -> Result<Self, CashierError> {
        let name = name.into();
        check_name(&name)?;
        check_amount(price)?;
        Ok(Self {
            id: None,
            name,
            description: None,
            department_id,
            price,
            void_state: VoidState::active(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Changes the price
    pub fn reprice(&mut self, price: Decimal) -> Result<(), CashierError> {
        check_amount(price)?;
        self.price = price;
        Ok(())
    }
}

impl Entity for Item {
    type Id = ItemId;
    const ENTITY_NAME: &'static str = "Item";
    const FIELDS: &'static [&'static str] = &[
        NAME_FIELD,
        DESCRIPTION_FIELD,
        DEPARTMENT_ID_FIELD,
        PRICE_FIELD,
        VOIDED_FIELD,
        VOID_REASON_FIELD,
        DATE_VOIDED_FIELD,
    ];

    fn id(&self) -> Option<ItemId> {
        self.id
    }

    fn assign_id(&mut self, id: ItemId) {
        self.id = Some(id);
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            ID_FIELD => Some(self.id.into()),
            NAME_FIELD => Some(self.name.as_str().into()),
            DESCRIPTION_FIELD => Some(self.description.clone().into()),
            DEPARTMENT_ID_FIELD => Some(self.department_id.into()),
            PRICE_FIELD => Some(self.price.into()),
            _ => self.void_state.field(name),
        }
    }

    /// Items list alphabetically
    fn default_order() -> Vec<SortOrder> {
        vec![SortOrder::asc(NAME_FIELD).ignore_case(), SortOrder::asc(ID_FIELD)]
    }

    fn validate(&self) -> Result<(), DataError> {
        check_name(&self.name)?;
        check_amount(self.price)?;
        Ok(())
    }
}

impl Voidable for Item {
    fn void_state(&self) -> &VoidState {
        &self.void_state
    }

    fn void_state_mut(&mut self) -> &mut VoidState {
        &mut self.void_state
    }
}

impl Named for Item {
    fn name(&self) -> &str {
        &self.name
    }
}
