//! Field rules shared by the cashier entities
//!
//! They mirror the column constraints of the schema so that every store
//! accepts and rejects the same records.

use rust_decimal::Decimal;

use crate::error::CashierError;
use crate::service::MAX_NAME_LENGTH;

/// Decimal places kept for prices and totals
pub const MAX_AMOUNT_SCALE: u32 = 4;

/// Largest whole part a price or total may have, `NUMERIC(19, 4)`
const MAX_AMOUNT_DIGITS: u32 = 15;

pub(crate) fn check_name(name: &str) -> Result<(), CashierError> {
    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(CashierError::NameTooLong {
            length,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Amounts must be non-negative and fit the stored precision exactly
///
/// Trailing zeros do not count towards the scale, so `1.23450` is accepted.
pub(crate) fn check_amount(amount: Decimal) -> Result<(), CashierError> {
    if amount < Decimal::ZERO {
        return Err(CashierError::NegativeAmount(amount));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(CashierError::ExcessPrecision {
            amount,
            max_scale: MAX_AMOUNT_SCALE,
        });
    }
    if amount.trunc() >= Decimal::from(10_i64.pow(MAX_AMOUNT_DIGITS)) {
        return Err(CashierError::AmountOutOfRange(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_scale_limit() {
        assert!(check_amount(dec!(1.2345)).is_ok());
        assert!(check_amount(dec!(1.23450)).is_ok());
        assert!(matches!(
            check_amount(dec!(1.23456)),
            Err(CashierError::ExcessPrecision { max_scale: 4, .. })
        ));
    }

    #[test]
    fn test_amount_magnitude_limit() {
        assert!(check_amount(dec!(999999999999999.9999)).is_ok());
        assert!(matches!(
            check_amount(dec!(1000000000000000)),
            Err(CashierError::AmountOutOfRange(_))
        ));
        assert!(matches!(check_amount(dec!(-0.01)), Err(CashierError::NegativeAmount(_))));
    }

    #[test]
    fn test_name_length_counts_characters() {
        assert!(check_name(&"é".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(matches!(
            check_name(&"a".repeat(MAX_NAME_LENGTH + 1)),
            Err(CashierError::NameTooLong { length: 256, max: 255 })
        ));
    }
}
