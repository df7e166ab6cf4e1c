//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`MethodName`] - Validated dotted API method name (`session.create`)
//! - [`OptionName`] - Validated configuration option name
//! - [`KeyIdentity`] - Kind-disambiguated name used for global key numbering
//! - [`Mode`] - Which configuration surface a run generates
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so every emitter can splice them into C
//! identifiers without re-checking.
//!
//! # Examples
//!
//! ```
//! use apiconf::core::types::{MethodName, OptionName};
//!
//! let method = MethodName::new("WT_SESSION.create").unwrap();
//! assert_eq!(method.c_ident(), "WT_SESSION_create");
//!
//! assert!(MethodName::new("bad..name").is_err());
//! assert!(OptionName::new("1st").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::naming;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid method name: {0}")]
    InvalidMethodName(String),

    #[error("invalid option name: {0}")]
    InvalidOptionName(String),
}

/// A validated API method name.
///
/// Method names are dotted paths:
/// - Cannot be empty
/// - Only ASCII alphanumerics, `_` and `.`
/// - Cannot start or end with `.`, cannot contain `..`
///
/// Ordering is byte-wise, which is the order methods are emitted in.
///
/// # Example
///
/// ```
/// use apiconf::core::types::MethodName;
///
/// let name = MethodName::new("WT_CONNECTION.open_session").unwrap();
/// assert_eq!(name.as_str(), "WT_CONNECTION.open_session");
///
/// assert!(MethodName::new("").is_err());
/// assert!(MethodName::new(".hidden").is_err());
/// assert!(MethodName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MethodName(String);

impl MethodName {
    /// Create a new validated method name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidMethodName` if the name is malformed.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidMethodName(
                "method name cannot be empty".into(),
            ));
        }
        if name.starts_with('.') || name.ends_with('.') {
            return Err(TypeError::InvalidMethodName(format!(
                "'{name}' cannot start or end with '.'"
            )));
        }
        if name.contains("..") {
            return Err(TypeError::InvalidMethodName(format!(
                "'{name}' cannot contain '..'"
            )));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '.'))
        {
            return Err(TypeError::InvalidMethodName(format!(
                "'{name}' cannot contain '{c}'"
            )));
        }
        Ok(())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a C identifier fragment (dots become underscores).
    pub fn c_ident(&self) -> String {
        naming::c_ident(&self.0)
    }
}

impl TryFrom<String> for MethodName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MethodName> for String {
    fn from(name: MethodName) -> Self {
        name.0
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MethodName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated configuration option name.
///
/// Option names end up as C struct fields and array-name fragments, so they
/// must be C identifiers: ASCII alphanumerics and `_`, not starting with a
/// digit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionName(String);

impl OptionName {
    /// Create a new validated option name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOptionName` if the name is not a C identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if !naming::is_c_identifier(&name) {
            return Err(TypeError::InvalidOptionName(format!(
                "'{name}' is not a valid identifier"
            )));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OptionName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OptionName> for String {
    fn from(name: OptionName) -> Self {
        name.0
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for OptionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The string an option is numbered under in the key registry.
///
/// Leaf options use their name verbatim. Categories upper-case the first
/// character, so a category `checkpoint` and a leaf `checkpoint` number
/// separately.
///
/// # Example
///
/// ```
/// use apiconf::core::types::{KeyIdentity, OptionName};
///
/// let name = OptionName::new("checkpoint").unwrap();
/// assert_eq!(KeyIdentity::leaf(&name).as_str(), "checkpoint");
/// assert_eq!(KeyIdentity::category(&name).as_str(), "Checkpoint");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct KeyIdentity(String);

impl KeyIdentity {
    /// Identity of a leaf option.
    pub fn leaf(name: &OptionName) -> Self {
        Self(name.as_str().to_string())
    }

    /// Identity of a category option.
    pub fn category(name: &OptionName) -> Self {
        Self(naming::capitalize_first(name.as_str()))
    }

    /// Get the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<KeyIdentity> for String {
    fn from(identity: KeyIdentity) -> Self {
        identity.0
    }
}

impl fmt::Display for KeyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which configuration surface a run generates.
///
/// Both modes share the generation algorithm; they differ in the schema
/// read, the artifacts written, and the accessors appended to the tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The library's own configuration surface.
    #[default]
    Primary,
    /// The test suite's configuration surface.
    Test,
}

impl Mode {
    /// Mode from the `--test` flag.
    pub fn from_test_flag(test: bool) -> Self {
        if test {
            Mode::Test
        } else {
            Mode::Primary
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Primary => write!(f, "primary"),
            Mode::Test => write!(f, "test"),
        }
    }
}
