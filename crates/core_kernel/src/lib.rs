//! Core Kernel - Foundational types for the cashier data layer
//!
//! This crate provides the building blocks shared by every entity service and
//! storage adapter:
//! - Strongly-typed, time-ordered entity identifiers
//! - Entity capability traits (identity, soft-delete, name search)
//! - Engine-neutral query criteria
//! - Paging information
//! - The uniform data error taxonomy
//! - The generic repository port

pub mod identifiers;
pub mod entity;
pub mod criteria;
pub mod paging;
pub mod error;
pub mod ports;

pub use identifiers::{DepartmentId, ItemId, BillId, PatientId, IdParseError};
pub use entity::{Entity, EntityId, Voidable, Named, VoidState, storage_timestamp, ID_FIELD, NAME_FIELD, VOIDED_FIELD};
pub use criteria::{Criteria, Predicate, FieldValue, SortOrder, SortDirection};
pub use paging::PagingInfo;
pub use error::DataError;
pub use ports::{
    GenericRepository, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
