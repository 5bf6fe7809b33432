//! Repository implementations
//!
//! A single generic repository serves every entity type; the per-entity
//! table mappings live beside it.
//!
//! # Architecture
//!
//! - Statements are built at runtime from criteria, with every value bound
//! - Each write runs in its own transaction
//! - Rows are mapped to domain types through `PgEntity`

pub mod cashier;
pub mod generic;

pub use cashier::{BillRow, DepartmentRow, ItemRow};
pub use generic::PgRepository;
