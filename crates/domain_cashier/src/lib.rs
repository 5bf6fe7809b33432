//! Cashier Domain - Billable Items, Departments and Bills
//!
//! This crate holds the cashier's persisted entities and the data service that
//! every entity type shares.
//!
//! # Data Service
//!
//! [`DataService`] layers validation and the void/unvoid state machine over a
//! [`GenericRepository`](core_kernel::GenericRepository) bound to one entity
//! type:
//! - `void_entity` / `unvoid_entity` move an entity between ACTIVE and VOIDED
//! - `get_all` lists entities, optionally including voided ones, optionally paged
//! - `find_by_name` performs a case-insensitive prefix search on named entities
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_cashier::{Item, ItemService, InMemoryRepository};
//! use std::sync::Arc;
//!
//! let service = ItemService::new(Arc::new(InMemoryRepository::new()));
//! let aspirin = service.save(Some(Item::new("Aspirin", department_id, price)?)).await?;
//! let aspirin = service.void_entity(Some(aspirin), Some("Recalled")).await?;
//! ```

pub mod department;
pub mod item;
pub mod bill;
pub mod service;
pub mod cashier;
pub mod memory;
pub mod error;
pub mod rules;

pub use department::Department;
pub use item::Item;
pub use bill::{Bill, BillStatus};
pub use service::{DataService, DepartmentService, ItemService, BillService, MAX_NAME_LENGTH};
pub use memory::InMemoryRepository;
pub use error::CashierError;
pub use rules::MAX_AMOUNT_SCALE;
