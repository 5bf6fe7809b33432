//! Bills issued to patients
//!
//! A bill is created `Pending`, becomes `Paid` once settled, or `Adjusted` when
//! a correcting bill replaces it. The correcting bill references the original
//! through `bill_adjusted`.

use chrono::{DateTime, Utc};
use core_kernel::entity::{DATE_VOIDED_FIELD, VOID_REASON_FIELD};
use core_kernel::{
    storage_timestamp, BillId, DataError, Entity, FieldValue, PatientId, Voidable, VoidState,
    ID_FIELD, VOIDED_FIELD,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CashierError;
use crate::rules::check_amount;

pub const RECEIPT_NUMBER_FIELD: &str = "receipt_number";
pub const PATIENT_ID_FIELD: &str = "patient_id";
pub const CASHIER_FIELD: &str = "cashier";
pub const STATUS_FIELD: &str = "status";
pub const TOTAL_FIELD: &str = "total";
pub const BILL_ADJUSTED_FIELD: &str = "bill_adjusted";
pub const CREATED_AT_FIELD: &str = "created_at";

/// Settlement status of a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    Paid,
    Adjusted,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Paid => "paid",
            BillStatus::Adjusted => "adjusted",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BillStatus::Pending),
            "paid" => Ok(BillStatus::Paid),
            "adjusted" => Ok(BillStatus::Adjusted),
            other => Err(format!("unknown bill status '{}'", other)),
        }
    }
}

/// A bill for a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Option<BillId>,
    pub receipt_number: String,
    pub patient_id: PatientId,
    pub cashier: String,
    pub status: BillStatus,
    pub total: Decimal,
    /// The bill this one corrects, if any
    pub bill_adjusted: Option<BillId>,
    pub created_at: DateTime<Utc>,
    pub void_state: VoidState,
}

impl Bill {
    /// Creates a new pending bill
    ///
    /// # Errors
    ///
    /// Returns an amount error if the total is negative or does not fit the
    /// stored precision
    pub fn new(
        receipt_number: impl Into<String>,
        patient_id: PatientId,
        cashier: impl Into<String>,
        total: Decimal,
    ) -> Result<Self, CashierError> {
        check_amount(total)?;
        Ok(Self {
            id: None,
            receipt_number: receipt_number.into(),
            patient_id,
            cashier: cashier.into(),
            status: BillStatus::Pending,
            total,
            bill_adjusted: None,
            created_at: storage_timestamp(),
            void_state: VoidState::active(),
        })
    }

    /// Records payment of a pending bill
    pub fn mark_paid(&mut self) -> Result<(), CashierError> {
        self.ensure_not_voided()?;
        if self.status != BillStatus::Pending {
            return Err(CashierError::InvalidStatusTransition {
                from: self.status,
                to: BillStatus::Paid,
            });
        }
        self.status = BillStatus::Paid;
        Ok(())
    }

    /// Replaces this bill with a correcting one
    ///
    /// Marks this bill `Adjusted` and returns a new pending bill for the same
    /// patient and total that references it. Only saved, non-voided bills that
    /// have not already been adjusted can be adjusted.
    pub fn adjust_with(&mut self, receipt_number: impl Into<String>) -> Result<Bill, CashierError> {
        self.ensure_not_voided()?;
        let id = self
            .id
            .ok_or_else(|| CashierError::UnsavedBill(self.receipt_number.clone()))?;
        if self.status == BillStatus::Adjusted {
            return Err(CashierError::InvalidStatusTransition {
                from: self.status,
                to: BillStatus::Adjusted,
            });
        }

        self.status = BillStatus::Adjusted;
        Ok(Bill {
            id: None,
            receipt_number: receipt_number.into(),
            patient_id: self.patient_id,
            cashier: self.cashier.clone(),
            status: BillStatus::Pending,
            total: self.total,
            bill_adjusted: Some(id),
            created_at: storage_timestamp(),
            void_state: VoidState::active(),
        })
    }

    fn ensure_not_voided(&self) -> Result<(), CashierError> {
        if self.void_state.voided {
            return Err(CashierError::BillVoided(self.receipt_number.clone()));
        }
        Ok(())
    }
}

impl Entity for Bill {
    type Id = BillId;
    const ENTITY_NAME: &'static str = "Bill";
    const FIELDS: &'static [&'static str] = &[
        RECEIPT_NUMBER_FIELD,
        PATIENT_ID_FIELD,
        CASHIER_FIELD,
        STATUS_FIELD,
        TOTAL_FIELD,
        BILL_ADJUSTED_FIELD,
        CREATED_AT_FIELD,
        VOIDED_FIELD,
        VOID_REASON_FIELD,
        DATE_VOIDED_FIELD,
    ];

    fn id(&self) -> Option<BillId> {
        self.id
    }

    fn assign_id(&mut self, id: BillId) {
        self.id = Some(id);
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            ID_FIELD => Some(self.id.into()),
            RECEIPT_NUMBER_FIELD => Some(self.receipt_number.as_str().into()),
            PATIENT_ID_FIELD => Some(self.patient_id.into()),
            CASHIER_FIELD => Some(self.cashier.as_str().into()),
            STATUS_FIELD => Some(self.status.as_str().into()),
            TOTAL_FIELD => Some(self.total.into()),
            BILL_ADJUSTED_FIELD => Some(self.bill_adjusted.into()),
            CREATED_AT_FIELD => Some(self.created_at.into()),
            _ => self.void_state.field(name),
        }
    }

    fn validate(&self) -> Result<(), DataError> {
        check_amount(self.total).map_err(DataError::from)
    }
}

impl Voidable for Bill {
    fn void_state(&self) -> &VoidState {
        &self.void_state
    }

    fn void_state_mut(&mut self) -> &mut VoidState {
        &mut self.void_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::EntityId;
    use rust_decimal_macros::dec;

    fn saved_bill() -> Bill {
        let mut bill = Bill::new("R-0001", PatientId::new(), "cashier1", dec!(42.00)).unwrap();
        bill.assign_id(BillId::generate());
        bill
    }

    #[test]
    fn test_new_bill_is_pending() {
        let bill = Bill::new("R-0001", PatientId::new(), "cashier1", dec!(10)).unwrap();
        assert_eq!(bill.status, BillStatus::Pending);
        assert!(bill.bill_adjusted.is_none());
        assert!(!bill.is_voided());
    }

    #[test]
    fn test_negative_total_rejected() {
        let result = Bill::new("R-0001", PatientId::new(), "cashier1", dec!(-5));
        assert!(matches!(result, Err(CashierError::NegativeAmount(_))));
    }

    #[test]
    fn test_total_beyond_stored_scale_rejected() {
        let result = Bill::new("R-0001", PatientId::new(), "cashier1", dec!(10.00001));
        assert!(matches!(result, Err(CashierError::ExcessPrecision { .. })));

        let mut bill = saved_bill();
        bill.total = dec!(10.00001);
        assert!(bill.validate().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_mark_paid_only_from_pending() {
        let mut bill = saved_bill();
        bill.mark_paid().unwrap();
        assert_eq!(bill.status, BillStatus::Paid);

        let err = bill.mark_paid().unwrap_err();
        assert!(matches!(
            err,
            CashierError::InvalidStatusTransition { from: BillStatus::Paid, to: BillStatus::Paid }
        ));
    }

    #[test]
    fn test_adjust_with_links_new_bill() {
        let mut original = saved_bill();
        let replacement = original.adjust_with("R-0002").unwrap();

        assert_eq!(original.status, BillStatus::Adjusted);
        assert_eq!(replacement.status, BillStatus::Pending);
        assert_eq!(replacement.bill_adjusted, original.id);
        assert_eq!(replacement.patient_id, original.patient_id);
        assert_eq!(replacement.total, original.total);
        assert!(replacement.id.is_none());
    }

    #[test]
    fn test_cannot_adjust_twice() {
        let mut original = saved_bill();
        original.adjust_with("R-0002").unwrap();
        assert!(original.adjust_with("R-0003").is_err());
    }

    #[test]
    fn test_cannot_adjust_unsaved_or_voided() {
        let mut unsaved = Bill::new("R-0001", PatientId::new(), "cashier1", dec!(1)).unwrap();
        assert!(matches!(unsaved.adjust_with("R-0002"), Err(CashierError::UnsavedBill(_))));

        let mut voided = saved_bill();
        voided.void_state.void("entered in error", Utc::now());
        assert!(matches!(voided.adjust_with("R-0002"), Err(CashierError::BillVoided(_))));
    }

    #[test]
    fn test_status_parsing() {
        for status in [BillStatus::Pending, BillStatus::Paid, BillStatus::Adjusted] {
            assert_eq!(status.as_str().parse::<BillStatus>().unwrap(), status);
        }
        assert!("refunded".parse::<BillStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_stored() {
        let json = serde_json::to_string(&BillStatus::Adjusted).unwrap();
        assert_eq!(json, format!("\"{}\"", BillStatus::Adjusted.as_str()));
    }
}
