//! Validated identifiers shared by the orchestrator and the providers.
//!
//! Names are parsed once at the boundary where they enter the system (a
//! provider's `tools/list` answer, a configuration file) and carried as
//! distinct newtypes afterwards, so an operation name can never be passed
//! where a provider name is expected.
//!
//! ```rust
//! use switchboard_core::identifiers::{OperationName, ProviderId};
//!
//! let op = OperationName::parse("unit_conversion").unwrap();
//! let provider: ProviderId = "units".parse().unwrap();
//! assert_eq!(op.as_str(), "unit_conversion");
//! assert_eq!(provider.to_string(), "units");
//!
//! assert!(OperationName::parse("").is_err());
//! assert!(ProviderId::parse("bad name").is_err());
//! ```

mod validation;

pub use validation::{IdValidationError, IdValidator, MAX_ID_LENGTH};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of an operation exposed by a provider.
///
/// Operation names form one flat namespace across every provider in a
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationName(String);

impl OperationName {
    /// Parse and validate an operation name
    pub fn parse(name: impl AsRef<str>) -> Result<Self, IdValidationError> {
        IdValidator::validate(name.as_ref()).map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create an operation name without validation (for testing only)
    #[doc(hidden)]
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OperationName {
    type Err = IdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<OperationName> for String {
    fn from(name: OperationName) -> Self {
        name.0
    }
}

impl TryFrom<String> for OperationName {
    type Error = IdValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        IdValidator::validate(&s)?;
        Ok(Self(s))
    }
}

impl AsRef<str> for OperationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for OperationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for OperationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Identity of a configured tool provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);

impl ProviderId {
    /// Parse and validate a provider identifier
    pub fn parse(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
        IdValidator::validate(id.as_ref()).map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create a provider identifier without validation (for testing only)
    #[doc(hidden)]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProviderId {
    type Err = IdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        id.0
    }
}

impl TryFrom<String> for ProviderId {
    type Error = IdValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        IdValidator::validate(&s)?;
        Ok(Self(s))
    }
}

impl AsRef<str> for ProviderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Correlation identifier attached to every invocation.
///
/// Identifiers are unique for the lifetime of the process, which keeps log
/// lines from different channels unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Allocate the next identifier
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
