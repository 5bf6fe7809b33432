//! Strongly-typed identifiers for cashier entities
//!
//! Each entity type has its own UUID newtype so a bill id can never be passed
//! where an item id is expected. Identifiers are UUIDv7 and therefore sort in
//! creation order, which is the default listing order for bills.
//!
//! The text form is `PREFIX-uuid` (`ITM-0190...`). Parsing accepts that form
//! or a bare UUID, and rejects an identifier of another kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::criteria::FieldValue;
use crate::entity::EntityId;

/// Failure to read an identifier from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("expected a {expected} identifier but found a {found} identifier")]
    WrongKind {
        expected: &'static str,
        found: String,
    },

    #[error("malformed identifier '{0}'")]
    Malformed(String),
}

/// Splits off a kind prefix and parses the UUID that follows
fn parse_prefixed(text: &str, prefix: &'static str) -> Result<Uuid, IdParseError> {
    let body = match text.split_once('-') {
        // The first group of a bare UUID is eight hex digits, never a prefix
        Some((head, rest)) if head.len() < 8 && head.chars().all(|c| c.is_ascii_uppercase()) => {
            if head != prefix {
                return Err(IdParseError::WrongKind {
                    expected: prefix,
                    found: head.to_string(),
                });
            }
            rest
        }
        _ => text,
    };
    Uuid::parse_str(body).map_err(|_| IdParseError::Malformed(text.to_string()))
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Kind prefix used in the text form
            pub const PREFIX: &'static str = $prefix;

            /// Creates a fresh, time-ordered identifier
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_prefixed(s, Self::PREFIX).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        impl From<$name> for FieldValue {
            fn from(id: $name) -> FieldValue {
                FieldValue::Uuid(id.0)
            }
        }

        impl EntityId for $name {
            fn generate() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(DepartmentId => "DEP");
define_id!(ItemId => "ITM");
define_id!(BillId => "BIL");
define_id!(
    /// A patient of the host platform; bills only reference them
    PatientId => "PAT"
);
