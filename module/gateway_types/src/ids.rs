//! Type-safe entity identifiers with validation
//!
//! All IDs use underscore-separated format: `prefix_uuid`.
//!
//! # Quick Start
//!
//! ```
//! use gateway_types::TenantId;
//!
//! let id = TenantId::generate();
//! assert!(id.as_str().starts_with("tenant_"));
//!
//! let id = TenantId::parse("tenant_550e8400-e29b-41d4-a716-446655440000")?;
//! # Ok::<(), gateway_types::IdError>(())
//! ```
//!
//! # Supported Entity Types
//!
//! | Type | Prefix | Use Case |
//! |------|--------|----------|
//! | `TenantId` | `tenant_` | Billing/budget tenant (team, org, API key owner) |
//! | `RequestId` | `req_` | A single completion request, end to end |
//! | `ProviderId` | `prov_` | Configured upstream LLM provider |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity ID prefixes
pub mod prefix {
    pub const TENANT: &str = "tenant_";
    pub const REQUEST: &str = "req_";
    pub const PROVIDER: &str = "prov_";
}

/// Errors that can occur during ID parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error(
        "Invalid prefix: expected '{expected}', found '{found}'\n\
         Hint: Entity IDs must start with '{expected}'.\n\
         Example: {expected}550e8400-e29b-41d4-a716-446655440000"
    )]
    InvalidPrefix { expected: &'static str, found: String },

    #[error(
        "Missing UUID component\n\
         Hint: ID format is 'prefix_uuid' where uuid is 36 characters."
    )]
    MissingUuid,

    #[error(
        "Invalid UUID format: '{0}'\n\
         Hint: UUID must be 36 characters, lowercase hex, hyphens at positions 8, 13, 18, 23."
    )]
    InvalidUuid(String),

    #[error("Empty ID string")]
    EmptyId,
}

impl IdError {
    /// Machine-readable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPrefix { .. } => "INVALID_PREFIX",
            Self::MissingUuid => "MISSING_UUID",
            Self::InvalidUuid(..) => "INVALID_UUID",
            Self::EmptyId => "EMPTY_ID",
        }
    }

    /// Actionable suggestion for fixing the error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidPrefix { expected, found } => {
                if found.starts_with(&expected.replace('_', "-")) {
                    Some(format!(
                        "Legacy hyphen format detected. Use underscore instead: '{}'",
                        found.replace('-', "_")
                    ))
                } else {
                    Some(format!("ID must start with '{expected}'"))
                }
            }
            Self::InvalidUuid(uuid) => {
                if uuid.len() != 36 {
                    Some(format!(
                        "UUID must be exactly 36 characters, got {}",
                        uuid.len()
                    ))
                } else {
                    Some("Verify UUID has hyphens at correct positions (8-4-4-4-12)".into())
                }
            }
            Self::MissingUuid => Some("Provide the UUID component after the prefix".into()),
            Self::EmptyId => Some("Provide a non-empty ID string".into()),
        }
    }
}

fn is_valid_uuid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 5 {
        return false;
    }
    let expected_lens = [8, 4, 4, 4, 12];
    for (part, &expected_len) in parts.iter().zip(expected_lens.iter()) {
        if part.len() != expected_len {
            return false;
        }
        if !part.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
            return false;
        }
    }
    true
}

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        $prefix:expr,
        $doc:expr
    ) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an ID from a string, validating format.
            ///
            /// Failed parse attempts are logged when the `telemetry` feature is enabled.
            pub fn parse(s: impl AsRef<str>) -> Result<Self, IdError> {
                let s = s.as_ref();
                let result = Self::parse_impl(s);

                #[cfg(feature = "telemetry")]
                if let Err(ref error) = result {
                    tracing::warn!(
                        id_type = stringify!($name),
                        error = %error,
                        input_len = s.len(),
                        expected_prefix = $prefix,
                        "failed to parse entity id"
                    );
                }

                result
            }

            fn parse_impl(s: &str) -> Result<Self, IdError> {
                if s.is_empty() {
                    return Err(IdError::EmptyId);
                }
                if !s.starts_with($prefix) {
                    return Err(IdError::InvalidPrefix {
                        expected: $prefix,
                        found: s.chars().take($prefix.len() + 1).collect(),
                    });
                }
                let uuid_part = &s[$prefix.len()..];
                if uuid_part.is_empty() {
                    return Err(IdError::MissingUuid);
                }
                if !is_valid_uuid(uuid_part) {
                    return Err(IdError::InvalidUuid(uuid_part.to_string()));
                }
                Ok(Self(s.to_string()))
            }

            /// Generate a new random ID
            pub fn generate() -> Self {
                Self(format!("{}{}", $prefix, uuid::Uuid::new_v4()))
            }

            /// Get the ID as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the prefix for this ID type
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
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

        impl std::str::FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id!(
    TenantId,
    prefix::TENANT,
    "Identifier for a billing/budget tenant (format: `tenant_<uuid>`)"
);

define_id!(
    RequestId,
    prefix::REQUEST,
    "Identifier for a single completion request (format: `req_<uuid>`)"
);

define_id!(
    ProviderId,
    prefix::PROVIDER,
    "Identifier for a configured upstream provider (format: `prov_<uuid>`)"
);

#[cfg(any(test, feature = "test-helpers"))]
macro_rules! impl_test_utilities {
    ($name:ident, $prefix:expr) => {
        impl $name {
            /// Create ID from a known UUID for testing
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(format!("{}{}", $prefix, uuid))
            }

            /// Create ID with sequential number for testing
            pub fn test_fixture(n: u32) -> Self {
                let uuid = uuid::Uuid::from_u128(n as u128);
                Self::from_uuid(uuid)
            }

            /// Create ID with a custom (possibly invalid) suffix, for error-path testing
            pub fn test_with_suffix(suffix: &str) -> Self {
                Self(format!("{}{}", $prefix, suffix))
            }
        }
    };
}

#[cfg(any(test, feature = "test-helpers"))]
impl_test_utilities!(TenantId, prefix::TENANT);
#[cfg(any(test, feature = "test-helpers"))]
impl_test_utilities!(RequestId, prefix::REQUEST);
#[cfg(any(test, feature = "test-helpers"))]
impl_test_utilities!(ProviderId, prefix::PROVIDER);
