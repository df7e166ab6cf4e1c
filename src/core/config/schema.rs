//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Location
//!
//! In order of precedence:
//! 1. `--config <file>` on the command line
//! 2. `$APICONF_CONFIG` if set
//! 3. `<root>/apiconf.toml`
//!
//! # Validation
//!
//! Values are validated after parsing: the symbol prefix must be a C
//! identifier, wrap widths must leave room for generated text, and paths
//! must not be empty.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::naming;

/// Narrowest wrap width accepted for generated text.
pub const MIN_WIDTH: usize = 40;

/// Tool configuration file.
///
/// # Example
///
/// ```toml
/// [primary]
/// schema = "dist/api_data.toml"
/// doc_template = "src/include/wiredtiger.in"
/// tables = "src/config/config_def.c"
/// entry_header = "src/include/config.h"
/// key_header = "src/include/conf.h"
///
/// [test]
/// schema = "dist/test_data.toml"
/// tables = "src/config/test_config.c"
///
/// [emit]
/// prefix = "WT"
/// include = "wt_internal.h"
/// doc_width = 100
/// table_width = 80
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Artifacts for the library's own configuration surface
    pub primary: PrimarySection,

    /// Artifacts for the test suite's configuration surface
    pub test: TestSection,

    /// Text generation settings
    pub emit: EmitSection,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.primary.validate()?;
        self.test.validate()?;
        self.emit.validate()
    }
}

/// `[primary]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PrimarySection {
    /// Schema file
    pub schema: Option<PathBuf>,

    /// Documentation template with `@configstart` regions
    pub doc_template: Option<PathBuf>,

    /// Validation-table source file
    pub tables: Option<PathBuf>,

    /// Header holding the slot defines
    pub entry_header: Option<PathBuf>,

    /// Header holding the key defines and key structure
    pub key_header: Option<PathBuf>,
}

impl PrimarySection {
    fn validate(&self) -> Result<(), ConfigError> {
        check_path("primary.schema", self.schema.as_deref())?;
        check_path("primary.doc_template", self.doc_template.as_deref())?;
        check_path("primary.tables", self.tables.as_deref())?;
        check_path("primary.entry_header", self.entry_header.as_deref())?;
        check_path("primary.key_header", self.key_header.as_deref())
    }
}

/// `[test]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TestSection {
    /// Test schema file
    pub schema: Option<PathBuf>,

    /// Test validation-table source file
    pub tables: Option<PathBuf>,
}

impl TestSection {
    fn validate(&self) -> Result<(), ConfigError> {
        check_path("test.schema", self.schema.as_deref())?;
        check_path("test.tables", self.tables.as_deref())
    }
}

/// `[emit]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EmitSection {
    /// Upper-case symbol prefix (`WT` gives `WT_CONFIG_CHECK`, `__wt_...`)
    pub prefix: Option<String>,

    /// Header included by the validation-table source
    pub include: Option<String>,

    /// Name recorded in the "do not edit" banner
    pub generator: Option<String>,

    /// Pointer written into regenerated documentation markers
    pub schema_note: Option<String>,

    /// Column width of documentation lines, comment prefix included
    pub doc_width: Option<usize>,

    /// Column width of validation records
    pub table_width: Option<usize>,
}

impl EmitSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.prefix {
            if !naming::is_c_identifier(prefix) {
                return Err(ConfigError::InvalidValue(format!(
                    "emit.prefix '{prefix}' is not a C identifier"
                )));
            }
        }
        for (key, width) in [("doc_width", self.doc_width), ("table_width", self.table_width)] {
            if let Some(width) = width {
                if width < MIN_WIDTH {
                    return Err(ConfigError::InvalidValue(format!(
                        "emit.{key} must be at least {MIN_WIDTH}, got {width}"
                    )));
                }
            }
        }
        if let Some(include) = &self.include {
            if include.trim().is_empty() {
                return Err(ConfigError::InvalidValue("emit.include cannot be empty".into()));
            }
        }
        Ok(())
    }
}

fn check_path(key: &str, path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(path) if path.as_os_str().is_empty() => Err(ConfigError::InvalidValue(format!(
            "{key} cannot be an empty path"
        ))),
        _ => Ok(()),
    }
}
