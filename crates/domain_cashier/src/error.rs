//! Cashier domain errors

use core_kernel::DataError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::bill::BillStatus;

/// Errors raised by cashier entity rules
#[derive(Debug, Error)]
pub enum CashierError {
    /// Prices and totals cannot be negative
    #[error("Amount must not be negative: {0}")]
    NegativeAmount(Decimal),

    /// Amounts are stored with a fixed number of decimal places
    #[error("Amount {amount} has more than {max_scale} decimal places")]
    ExcessPrecision { amount: Decimal, max_scale: u32 },

    #[error("Amount is too large to store: {0}")]
    AmountOutOfRange(Decimal),

    #[error("Name is {length} characters long, at most {max} are allowed")]
    NameTooLong { length: usize, max: usize },

    /// A bill cannot move between these statuses
    #[error("Invalid bill status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: BillStatus,
        to: BillStatus,
    },

    /// Voided bills cannot be changed
    #[error("Bill is voided: {0}")]
    BillVoided(String),

    /// The bill has not been saved yet
    #[error("Bill has not been saved: {0}")]
    UnsavedBill(String),
}

impl From<CashierError> for DataError {
    fn from(error: CashierError) -> Self {
        let argument = match &error {
            CashierError::NegativeAmount(_)
            | CashierError::ExcessPrecision { .. }
            | CashierError::AmountOutOfRange(_) => "amount",
            CashierError::NameTooLong { .. } => "name",
            CashierError::InvalidStatusTransition { .. }
            | CashierError::BillVoided(_)
            | CashierError::UnsavedBill(_) => "bill",
        };
        DataError::invalid_argument(argument, error.to_string())
    }
}
