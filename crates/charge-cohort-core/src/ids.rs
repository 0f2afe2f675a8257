//! Identifier types for charge cohorts.
//!
//! Billing identifiers are assigned by the remote service (`ch_...`,
//! `cus_...`) and treated as opaque strings. The `remote_id_type!` macro keeps
//! their trait implementations consistent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to define an opaque, remote-assigned identifier type.
///
/// This macro generates a newtype wrapper around `String` with implementations for:
/// - `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `Serialize`, `Deserialize` (as string, rejecting empty input)
/// - `FromStr`, `Display`, `Debug`
/// - `TryFrom<String>`, `Into<String>`, `AsRef<str>`
macro_rules! remote_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting empty input.
            ///
            /// # Errors
            ///
            /// Returns `IdError::Empty` if `value` is empty or whitespace.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(IdError::Empty);
                }
                Ok(Self(value))
            }

            /// Return the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

remote_id_type!(ChargeId, "A charge identifier assigned by the billing service.\n\nUsed as the `starting_after` cursor in cursor pagination.");
remote_id_type!(CustomerId, "A customer identifier assigned by the billing service.");

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is empty.
    #[error("identifier must not be empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_id_roundtrip() {
        let id = ChargeId::new("ch_123").unwrap();
        let parsed = ChargeId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert_eq!(parsed.as_str(), "ch_123");
    }

    #[test]
    fn charge_id_serde_json() {
        let id = ChargeId::new("ch_abc").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ch_abc\"");
        let parsed: ChargeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn empty_ids_are_rejected() {
        assert_eq!(ChargeId::new(""), Err(IdError::Empty));
        assert_eq!(CustomerId::from_str("  "), Err(IdError::Empty));
        assert!(serde_json::from_str::<CustomerId>("\"\"").is_err());
    }

    #[test]
    fn debug_includes_type_name() {
        let id = CustomerId::new("cus_1").unwrap();
        assert_eq!(format!("{id:?}"), "CustomerId(cus_1)");
    }
}
