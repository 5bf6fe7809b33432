//! Test Data Builders
//!
//! Builders for cashier entities with sensible defaults, so tests only spell
//! out the fields they care about.

use chrono::{DateTime, Utc};
use core_kernel::{storage_timestamp, BillId, DepartmentId, PatientId, VoidState};
use domain_cashier::{Bill, BillStatus, Department, Item};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Builder for departments
pub struct DepartmentBuilder {
    name: String,
    description: Option<String>,
    void_state: VoidState,
}

impl Default for DepartmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DepartmentBuilder {
    pub fn new() -> Self {
        Self {
            name: "General".to_string(),
            description: None,
            void_state: VoidState::active(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the department voided now with the given reason
    pub fn voided(mut self, reason: impl Into<String>) -> Self {
        self.void_state.void(reason, storage_timestamp());
        self
    }

    pub fn build(self) -> Department {
        Department {
            id: None,
            name: self.name,
            description: self.description,
            void_state: self.void_state,
        }
    }
}

/// Builder for billable items
pub struct ItemBuilder {
    name: String,
    description: Option<String>,
    department_id: DepartmentId,
    price: Decimal,
    void_state: VoidState,
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemBuilder {
    /// Starts an item in a fresh, unsaved department
    pub fn new() -> Self {
        Self {
            name: "Paracetamol".to_string(),
            description: None,
            department_id: DepartmentId::new(),
            price: dec!(1.00),
            void_state: VoidState::active(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn in_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = department_id;
        self
    }

    /// Sets the price without validation, so tests can build invalid items
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    pub fn voided(mut self, reason: impl Into<String>) -> Self {
        self.void_state.void(reason, storage_timestamp());
        self
    }

    pub fn build(self) -> Item {
        Item {
            id: None,
            name: self.name,
            description: self.description,
            department_id: self.department_id,
            price: self.price,
            void_state: self.void_state,
        }
    }
}

/// Builder for bills
pub struct BillBuilder {
    receipt_number: String,
    patient_id: PatientId,
    cashier: String,
    status: BillStatus,
    total: Decimal,
    bill_adjusted: Option<BillId>,
    created_at: DateTime<Utc>,
    void_state: VoidState,
}

impl Default for BillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BillBuilder {
    pub fn new() -> Self {
        Self {
            receipt_number: "R-0001".to_string(),
            patient_id: PatientId::new(),
            cashier: "cashier1".to_string(),
            status: BillStatus::Pending,
            total: dec!(100.00),
            bill_adjusted: None,
            created_at: storage_timestamp(),
            void_state: VoidState::active(),
        }
    }

    pub fn with_receipt_number(mut self, receipt_number: impl Into<String>) -> Self {
        self.receipt_number = receipt_number.into();
        self
    }

    pub fn for_patient(mut self, patient_id: PatientId) -> Self {
        self.patient_id = patient_id;
        self
    }

    pub fn with_cashier(mut self, cashier: impl Into<String>) -> Self {
        self.cashier = cashier.into();
        self
    }

    pub fn with_status(mut self, status: BillStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total = total;
        self
    }

    pub fn adjusting(mut self, original: BillId) -> Self {
        self.bill_adjusted = Some(original);
        self
    }

    pub fn voided(mut self, reason: impl Into<String>) -> Self {
        self.void_state.void(reason, storage_timestamp());
        self
    }

    pub fn build(self) -> Bill {
        Bill {
            id: None,
            receipt_number: self.receipt_number,
            patient_id: self.patient_id,
            cashier: self.cashier,
            status: self.status,
            total: self.total,
            bill_adjusted: self.bill_adjusted,
            created_at: self.created_at,
            void_state: self.void_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Voidable;

    #[test]
    fn test_item_builder_defaults() {
        let item = ItemBuilder::new().build();
        assert_eq!(item.name, "Paracetamol");
        assert_eq!(item.price, dec!(1.00));
        assert!(!item.is_voided());
    }

    #[test]
    fn test_voided_builders() {
        let department = DepartmentBuilder::new().voided("Closed").build();
        assert_eq!(department.void_reason(), Some("Closed"));

        let bill = BillBuilder::new().with_status(BillStatus::Paid).voided("Duplicate").build();
        assert!(bill.is_voided());
        assert_eq!(bill.status, BillStatus::Paid);
    }
}
