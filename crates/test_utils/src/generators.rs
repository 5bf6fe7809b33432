//! Property-Based Test Generators
//!
//! Proptest strategies for cashier data that respect the entity invariants.

use core_kernel::{DepartmentId, PagingInfo};
use domain_cashier::{Item, MAX_AMOUNT_SCALE, MAX_NAME_LENGTH};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Names of 1 to 40 printable characters starting with a letter
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 \\-]{0,39}"
}

/// Name fragments that pass validation, up to the maximum length
pub fn valid_fragment_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::char::range('a', 'z'), 1..=MAX_NAME_LENGTH)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Non-negative prices that fit the stored scale
pub fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64, 0u32..=MAX_AMOUNT_SCALE).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Non-negative prices with up to eight decimal places, many beyond the stored
/// scale
pub fn any_scale_price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64, 0u32..=8u32).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Valid paging bounds
pub fn paging_strategy() -> impl Strategy<Value = PagingInfo> {
    (1u32..20u32, 1u32..20u32).prop_map(|(page, size)| PagingInfo::new(page, size))
}

/// Unsaved items in one department, some voided
pub fn items_strategy(department: DepartmentId, max: usize) -> impl Strategy<Value = Vec<Item>> {
    proptest::collection::vec((name_strategy(), price_strategy(), any::<bool>()), 0..=max).prop_map(
        move |specs| {
            specs
                .into_iter()
                .filter_map(|(name, price, voided)| {
                    let mut item = Item::new(name, department, price).ok()?;
                    if voided {
                        item.void_state.void("generated", core_kernel::storage_timestamp());
                    }
                    Some(item)
                })
                .collect()
        },
    )
}
