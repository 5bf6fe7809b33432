//! Engine-neutral query criteria
//!
//! Criteria are plain data: a conjunction of predicates over named columns, an
//! ordering and an optional result window. Each storage adapter translates
//! them into its native query language; the in-memory adapter evaluates them
//! directly through [`Entity::field`].
//!
//! # Example
//!
//! ```rust
//! use core_kernel::{Criteria, Predicate, SortOrder};
//!
//! let criteria = Criteria::new()
//!     .add(Predicate::eq("voided", false))
//!     .add(Predicate::starts_with_ignore_case("name", "asp"))
//!     .order_by(SortOrder::asc("name").ignore_case())
//!     .window(0, 25);
//!
//! assert_eq!(criteria.predicates.len(), 2);
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

use crate::entity::{Entity, ID_FIELD};
use crate::error::DataError;

/// A column value as seen by criteria
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values with SQL-like null placement (nulls sort last)
    fn compare(&self, other: &FieldValue, ignore_case: bool) -> Ordering {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Greater,
            (_, FieldValue::Null) => Ordering::Less,
            (FieldValue::Text(a), FieldValue::Text(b)) if ignore_case => {
                a.to_lowercase().cmp(&b.to_lowercase())
            }
            (a, b) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Text(s) => write!(f, "'{}'", s),
            FieldValue::Uuid(u) => write!(f, "{}", u),
            FieldValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// A filter over a single entity type
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Column equals value; a `Null` value matches null columns
    Eq {
        field: &'static str,
        value: FieldValue,
    },
    /// Text column starts with the prefix
    StartsWith {
        field: &'static str,
        prefix: String,
        ignore_case: bool,
    },
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: &'static str, value: impl Into<FieldValue>) -> Self {
        Predicate::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn is_null(field: &'static str) -> Self {
        Predicate::Eq {
            field,
            value: FieldValue::Null,
        }
    }

    pub fn starts_with(field: &'static str, prefix: impl Into<String>) -> Self {
        Predicate::StartsWith {
            field,
            prefix: prefix.into(),
            ignore_case: false,
        }
    }

    pub fn starts_with_ignore_case(field: &'static str, prefix: impl Into<String>) -> Self {
        Predicate::StartsWith {
            field,
            prefix: prefix.into(),
            ignore_case: true,
        }
    }

    pub fn not(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }

    /// Evaluates the predicate against an entity
    ///
    /// Predicates over columns the entity does not have never match; stores
    /// reject such criteria up front with [`Criteria::check_fields`].
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        match self {
            Predicate::Eq { field, value } => entity
                .field(field)
                .map_or(false, |actual| &actual == value),
            Predicate::StartsWith {
                field,
                prefix,
                ignore_case,
            } => match entity.field(field) {
                Some(FieldValue::Text(text)) if *ignore_case => {
                    text.to_lowercase().starts_with(&prefix.to_lowercase())
                }
                Some(FieldValue::Text(text)) => text.starts_with(prefix.as_str()),
                _ => false,
            },
            Predicate::Not(inner) => !inner.matches(entity),
            Predicate::And(all) => all.iter().all(|p| p.matches(entity)),
            Predicate::Or(any) => any.iter().any(|p| p.matches(entity)),
        }
    }

    /// Returns every column referenced by this predicate
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Predicate::Eq { field, .. } | Predicate::StartsWith { field, .. } => vec![*field],
            Predicate::Not(inner) => inner.fields(),
            Predicate::And(list) | Predicate::Or(list) => {
                list.iter().flat_map(Predicate::fields).collect()
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq { field, value } => write!(f, "{} = {}", field, value),
            Predicate::StartsWith {
                field,
                prefix,
                ignore_case,
            } => {
                write!(f, "{} starts with '{}'", field, prefix)?;
                if *ignore_case {
                    write!(f, " (ignore case)")?;
                }
                Ok(())
            }
            Predicate::Not(inner) => write!(f, "not ({})", inner),
            Predicate::And(list) => write_joined(f, list, " and "),
            Predicate::Or(list) => write_joined(f, list, " or "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, list: &[Predicate], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, p) in list.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", p)?;
    }
    write!(f, ")")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering on one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: &'static str,
    pub direction: SortDirection,
    pub ignore_case: bool,
}

impl SortOrder {
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
            ignore_case: false,
        }
    }

    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
            ignore_case: false,
        }
    }

    /// Compares text case-insensitively
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

/// A query over one entity type
///
/// All predicates must hold (conjunction). `limit` and `offset` describe the
/// result window; they do not affect [`Criteria::matches`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub predicates: Vec<Predicate>,
    pub order: Vec<SortOrder>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Criteria {
    /// Creates criteria matching every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria selecting a single record by identity
    pub fn by_id(id: impl Into<uuid::Uuid>) -> Self {
        Self::new().add(Predicate::eq(ID_FIELD, id.into()))
    }

    /// Adds a predicate that must hold
    pub fn add(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Appends an ordering column
    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.order.push(order);
        self
    }

    /// Restricts the result to `limit` records after skipping `offset`
    pub fn window(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    /// Returns a copy with only the filter, used for counting
    pub fn filter_only(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            ..Self::default()
        }
    }

    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        self.predicates.iter().all(|p| p.matches(entity))
    }

    /// The ordering to apply for entity type `E`
    ///
    /// Falls back to the entity's default order and always ends with the
    /// identity column so that paging is stable.
    pub fn effective_order<E: Entity>(&self) -> Vec<SortOrder> {
        let mut order = if self.order.is_empty() {
            E::default_order()
        } else {
            self.order.clone()
        };
        if !order.iter().any(|o| o.field == ID_FIELD) {
            order.push(SortOrder::asc(ID_FIELD));
        }
        order
    }

    /// Sorts entities in place by the effective order
    pub fn sort<E: Entity>(&self, entities: &mut [E]) {
        let order = self.effective_order::<E>();
        entities.sort_by(|a, b| {
            for o in &order {
                let left = a.field(o.field).unwrap_or(FieldValue::Null);
                let right = b.field(o.field).unwrap_or(FieldValue::Null);
                let ordering = match o.direction {
                    SortDirection::Ascending => left.compare(&right, o.ignore_case),
                    SortDirection::Descending => right.compare(&left, o.ignore_case),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Every column referenced by predicates or ordering
    pub fn fields(&self) -> Vec<&'static str> {
        self.predicates
            .iter()
            .flat_map(Predicate::fields)
            .chain(self.order.iter().map(|o| o.field))
            .collect()
    }

    /// Rejects criteria that reference a field entity type `E` does not have
    pub fn check_fields<E: Entity>(&self) -> Result<(), DataError> {
        match self.fields().into_iter().find(|f| !E::has_field(f)) {
            Some(field) => Err(DataError::invalid_argument(
                "criteria",
                format!("{} has no column '{}'", E::ENTITY_NAME, field),
            )),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return write!(f, "all records");
        }
        for (i, p) in self.predicates.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}
