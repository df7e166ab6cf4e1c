//! core::paths
//!
//! Centralized path routing for schema inputs and generated artifacts.
//!
//! # Architecture
//!
//! Configured paths are relative to the project root unless absolute. All
//! resolution goes through [`ProjectPaths`] so commands never join paths
//! themselves.
//!
//! # Artifacts per mode
//!
//! - [`Mode::Primary`]: documentation template, validation tables, entry
//!   header, key header
//! - [`Mode::Test`]: test validation tables only
//!
//! # Example
//!
//! ```
//! use apiconf::core::config::Config;
//! use apiconf::core::paths::ProjectPaths;
//! use apiconf::core::types::Mode;
//! use std::path::PathBuf;
//!
//! let paths = ProjectPaths::new(PathBuf::from("/project"));
//! let config = Config::default();
//!
//! assert_eq!(
//!     paths.tables(&config, Mode::Test),
//!     PathBuf::from("/project/src/config/test_config.c")
//! );
//! ```

use std::path::{Path, PathBuf};

use super::config::Config;
use super::types::Mode;

/// Path routing for one project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    /// Create paths for a project root.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a configured path against the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Schema file for a mode.
    pub fn schema(&self, config: &Config, mode: Mode) -> PathBuf {
        match mode {
            Mode::Primary => self.resolve(config.primary_schema()),
            Mode::Test => self.resolve(config.test_schema()),
        }
    }

    /// Validation-table artifact for a mode.
    pub fn tables(&self, config: &Config, mode: Mode) -> PathBuf {
        match mode {
            Mode::Primary => self.resolve(config.primary_tables()),
            Mode::Test => self.resolve(config.test_tables()),
        }
    }

    /// Documentation template (primary mode only).
    pub fn doc_template(&self, config: &Config) -> PathBuf {
        self.resolve(config.doc_template())
    }

    /// Slot-define header (primary mode only).
    pub fn entry_header(&self, config: &Config) -> PathBuf {
        self.resolve(config.entry_header())
    }

    /// Key header (primary mode only).
    pub fn key_header(&self, config: &Config) -> PathBuf {
        self.resolve(config.key_header())
    }
}
