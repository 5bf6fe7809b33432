//! Custom Test Assertions
//!
//! Assertion helpers for data errors and entity listings that give more
//! meaningful failure messages than plain `assert!`.

use core_kernel::{DataError, Named, Voidable};

/// Asserts that the result is an `InvalidArgument` error naming `argument`
///
/// # Panics
///
/// Panics if the result is `Ok` or a different error
pub fn assert_invalid_argument<T: std::fmt::Debug>(result: Result<T, DataError>, argument: &str) {
    match result {
        Err(DataError::InvalidArgument { argument: actual, .. }) => assert_eq!(
            actual, argument,
            "InvalidArgument names '{}' but '{}' was expected",
            actual, argument
        ),
        other => panic!("Expected InvalidArgument for '{}', got {:?}", argument, other),
    }
}

/// Asserts that the result is a `NullReference` error
pub fn assert_null_reference<T: std::fmt::Debug>(result: Result<T, DataError>) {
    assert!(
        matches!(result, Err(DataError::NullReference { .. })),
        "Expected NullReference, got {:?}",
        result
    );
}

/// Asserts that the result is a `Storage` error
pub fn assert_storage_error<T: std::fmt::Debug>(result: Result<T, DataError>) {
    assert!(
        matches!(result, Err(DataError::Storage { .. })),
        "Expected Storage error, got {:?}",
        result
    );
}

/// Asserts that no entity in the listing is voided
pub fn assert_none_voided<E: Voidable>(entities: &[E]) {
    let voided: Vec<_> = entities
        .iter()
        .filter(|e| e.is_voided())
        .map(|e| format!("{:?}", e.id()))
        .collect();
    assert!(voided.is_empty(), "Expected no voided entities, found {}", voided.join(", "));
}

/// Asserts the listing's names, in order
pub fn assert_names<E: Named>(entities: &[E], expected: &[&str]) {
    let actual: Vec<&str> = entities.iter().map(|e| e.name()).collect();
    assert_eq!(actual, expected, "Unexpected names or order");
}
