//! Table mappings for the cashier entities
//!
//! Departments, items and bills each live in their own table. The void
//! columns (`voided`, `void_reason`, `date_voided`) are shared by all three.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::Postgres;
use sqlx::query_builder::Separated;
use sqlx::FromRow;
use uuid::Uuid;

use core_kernel::{BillId, DataError, DepartmentId, ItemId, PatientId, VoidState};
use domain_cashier::{Bill, BillStatus, Department, Item};

use crate::mapping::{decode_error, PgEntity};

fn push_void_state(values: &mut Separated<'_, 'static, Postgres, &'static str>, state: &VoidState) {
    values.push_bind(state.voided);
    values.push_bind(state.void_reason.clone());
    values.push_bind(state.date_voided);
}

fn void_state(voided: bool, void_reason: Option<String>, date_voided: Option<DateTime<Utc>>) -> VoidState {
    VoidState {
        voided,
        void_reason,
        date_voided,
    }
}

/// Database row for `departments`
#[derive(Debug, Clone, FromRow)]
pub struct DepartmentRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub voided: bool,
    pub void_reason: Option<String>,
    pub date_voided: Option<DateTime<Utc>>,
}

impl PgEntity for Department {
    type Row = DepartmentRow;
    const TABLE: &'static str = "departments";

    fn push_values(&self, values: &mut Separated<'_, 'static, Postgres, &'static str>) {
        values.push_bind(self.name.clone());
        values.push_bind(self.description.clone());
        push_void_state(values, &self.void_state);
    }

    fn from_row(row: DepartmentRow) -> Result<Self, DataError> {
        Ok(Department {
            id: Some(DepartmentId::from_uuid(row.id)),
            name: row.name,
            description: row.description,
            void_state: void_state(row.voided, row.void_reason, row.date_voided),
        })
    }
}

/// Database row for `items`
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub department_id: Uuid,
    pub price: Decimal,
    pub voided: bool,
    pub void_reason: Option<String>,
    pub date_voided: Option<DateTime<Utc>>,
}

impl PgEntity for Item {
    type Row = ItemRow;
    const TABLE: &'static str = "items";

    fn push_values(&self, values: &mut Separated<'_, 'static, Postgres, &'static str>) {
        values.push_bind(self.name.clone());
        values.push_bind(self.description.clone());
        values.push_bind(Uuid::from(self.department_id));
        values.push_bind(self.price);
        push_void_state(values, &self.void_state);
    }

    fn from_row(row: ItemRow) -> Result<Self, DataError> {
        Ok(Item {
            id: Some(ItemId::from_uuid(row.id)),
            name: row.name,
            description: row.description,
            department_id: DepartmentId::from_uuid(row.department_id),
            price: row.price,
            void_state: void_state(row.voided, row.void_reason, row.date_voided),
        })
    }
}

/// Database row for `bills`
#[derive(Debug, Clone, FromRow)]
pub struct BillRow {
    pub id: Uuid,
    pub receipt_number: String,
    pub patient_id: Uuid,
    pub cashier: String,
    pub status: String,
    pub total: Decimal,
    pub bill_adjusted: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub voided: bool,
    pub void_reason: Option<String>,
    pub date_voided: Option<DateTime<Utc>>,
}

impl PgEntity for Bill {
    type Row = BillRow;
    const TABLE: &'static str = "bills";

    fn push_values(&self, values: &mut Separated<'_, 'static, Postgres, &'static str>) {
        values.push_bind(self.receipt_number.clone());
        values.push_bind(Uuid::from(self.patient_id));
        values.push_bind(self.cashier.clone());
        values.push_bind(self.status.as_str());
        values.push_bind(self.total);
        values.push_bind(self.bill_adjusted.map(Uuid::from));
        values.push_bind(self.created_at);
        push_void_state(values, &self.void_state);
    }

    fn from_row(row: BillRow) -> Result<Self, DataError> {
        let status: BillStatus = row.status.parse().map_err(|e| decode_error::<Bill>(e))?;
        Ok(Bill {
            id: Some(BillId::from_uuid(row.id)),
            receipt_number: row.receipt_number,
            patient_id: PatientId::from_uuid(row.patient_id),
            cashier: row.cashier,
            status,
            total: row.total,
            bill_adjusted: row.bill_adjusted.map(BillId::from_uuid),
            created_at: row.created_at,
            void_state: void_state(row.voided, row.void_reason, row.date_voided),
        })
    }
}
