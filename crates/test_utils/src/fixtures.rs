//! Pre-built Test Fixtures
//!
//! Consistent cashier data for tests. The medication set is the canonical
//! name-search fixture: "Asp" matches Aspirin (active) and Aspartame (voided).

use chrono::{TimeZone, Utc};
use core_kernel::{DepartmentId, PatientId, VoidState};
use domain_cashier::{Bill, Department, Item};
use fake::faker::lorem::en::Word;
use fake::Fake;
use rust_decimal_macros::dec;

/// Fixture for departments
pub struct DepartmentFixtures;

impl DepartmentFixtures {
    pub fn pharmacy() -> Department {
        Department::new("Pharmacy").with_description("Dispensary and over-the-counter sales")
    }

    pub fn radiology() -> Department {
        Department::new("Radiology")
    }

    /// A department with a random single-word name
    pub fn random() -> Department {
        let name: String = Word().fake();
        Department::new(capitalize(&name))
    }
}

/// Fixture for billable items
pub struct ItemFixtures;

impl ItemFixtures {
    pub fn aspirin(department: DepartmentId) -> Item {
        item("Aspirin", department, dec!(2.50))
    }

    /// Voided with reason "Not a medication"
    pub fn aspartame(department: DepartmentId) -> Item {
        let mut item = item("Aspartame", department, dec!(1.25));
        item.void_state = VoidState {
            voided: true,
            void_reason: Some("Not a medication".to_string()),
            date_voided: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()),
        };
        item
    }

    pub fn tylenol(department: DepartmentId) -> Item {
        item("Tylenol", department, dec!(3.75))
    }

    /// Aspirin, Aspartame (voided) and Tylenol
    pub fn medications(department: DepartmentId) -> Vec<Item> {
        vec![
            Self::aspirin(department),
            Self::aspartame(department),
            Self::tylenol(department),
        ]
    }

    /// `count` active items named "Item 01", "Item 02", ...
    pub fn numbered(department: DepartmentId, count: usize) -> Vec<Item> {
        (1..=count)
            .map(|n| item(&format!("Item {:02}", n), department, dec!(1.00)))
            .collect()
    }
}

/// Fixture for bills
pub struct BillFixtures;

impl BillFixtures {
    pub fn pending(receipt_number: &str) -> Bill {
        Bill::new(receipt_number, PatientId::new(), "cashier1", dec!(120.50))
            .expect("fixture total is non-negative")
    }
}

fn item(name: &str, department: DepartmentId, price: rust_decimal::Decimal) -> Item {
    Item::new(name, department, price).expect("fixture price is non-negative")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
