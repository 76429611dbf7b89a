//! Persistent object identifiers
//!
//! A `Pid` is the repository-wide identifier of a digital object, shaped
//! `namespace:identifier` (e.g. `demo:1`). Pids are minted by the object
//! store and immutable once assigned to an object.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// URI scheme prefix under which objects are addressed in relationship
/// assertions (`info:fedora/demo:1`).
pub const OBJECT_URI_PREFIX: &str = "info:fedora/";

/// Error raised when a string does not parse as a pid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pid {value:?}: {reason}")]
pub struct PidParseError {
    pub value: String,
    pub reason: &'static str,
}

/// Persistent identifier of a digital object
///
/// Stored as the raw `namespace:identifier` string. Construction goes
/// through [`Pid::parse`] so that every held value is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(String);

impl Pid {
    /// Parse a `namespace:identifier` string into a pid
    ///
    /// # Errors
    ///
    /// Returns `PidParseError` if either part is empty or the colon
    /// separator is missing.
    pub fn parse(value: &str) -> Result<Self, PidParseError> {
        let Some((namespace, id)) = value.split_once(':') else {
            return Err(PidParseError {
                value: value.to_string(),
                reason: "missing ':' separator",
            });
        };
        if namespace.is_empty() {
            return Err(PidParseError {
                value: value.to_string(),
                reason: "empty namespace",
            });
        }
        if id.is_empty() {
            return Err(PidParseError {
                value: value.to_string(),
                reason: "empty identifier",
            });
        }
        Ok(Self(value.to_string()))
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace part (before the colon)
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or("")
    }

    /// The identifier part (after the colon)
    pub fn short_id(&self) -> &str {
        self.0.split_once(':').map(|(_, id)| id).unwrap_or("")
    }

    /// The URI form used as a relationship target (`info:fedora/<pid>`)
    pub fn uri(&self) -> String {
        format!("{OBJECT_URI_PREFIX}{}", self.0)
    }

    /// Recover a pid from its URI form, if it is one
    pub fn from_uri(uri: &str) -> Option<Self> {
        let raw = uri.strip_prefix(OBJECT_URI_PREFIX)?;
        Self::parse(raw).ok()
    }
}

impl std::fmt::Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pid {
    type Err = PidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
