//! core::config
//!
//! Tool configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file (`$APICONF_CONFIG`, else `<root>/apiconf.toml`)
//! 3. CLI flags (not handled here)
//!
//! A missing config file is not an error; one that fails to parse or
//! validate is.
//!
//! # Example
//!
//! ```no_run
//! use apiconf::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("/path/to/project"), None).unwrap();
//! println!("prefix: {}", config.prefix());
//! println!("schema: {}", config.primary_schema().display());
//! ```

pub mod schema;

pub use schema::{ConfigFile, EmitSection, PrimarySection, TestSection};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "APICONF_CONFIG";

/// Config file name looked up at the project root.
pub const CONFIG_FILE_NAME: &str = "apiconf.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values read from the config file
    pub file: ConfigFile,
    /// Path the file was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration for a project root.
    ///
    /// An `explicit` path (from `--config`) must exist. Otherwise
    /// `$APICONF_CONFIG` is used if it names an existing file, then
    /// `<root>/apiconf.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_with(root, explicit, env.as_deref())
    }

    fn load_with(
        root: &Path,
        explicit: Option<&Path>,
        env: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let path = match (explicit, env) {
            (Some(path), _) => Some(path.to_path_buf()),
            (None, Some(path)) if path.exists() => Some(path.to_path_buf()),
            _ => {
                let path = root.join(CONFIG_FILE_NAME);
                path.exists().then_some(path)
            }
        };

        let file = match &path {
            Some(path) => Self::read_config(path)?,
            None => ConfigFile::default(),
        };
        file.validate()?;

        Ok(Config { file, path })
    }

    /// Configuration from already-parsed values, not tied to a file.
    pub fn from_file(file: ConfigFile) -> Self {
        Self { file, path: None }
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Primary schema file. Defaults to `dist/api_data.toml`.
    pub fn primary_schema(&self) -> &Path {
        self.file
            .primary
            .schema
            .as_deref()
            .unwrap_or(Path::new("dist/api_data.toml"))
    }

    /// Documentation template. Defaults to `src/include/wiredtiger.in`.
    pub fn doc_template(&self) -> &Path {
        self.file
            .primary
            .doc_template
            .as_deref()
            .unwrap_or(Path::new("src/include/wiredtiger.in"))
    }

    /// Primary validation tables. Defaults to `src/config/config_def.c`.
    pub fn primary_tables(&self) -> &Path {
        self.file
            .primary
            .tables
            .as_deref()
            .unwrap_or(Path::new("src/config/config_def.c"))
    }

    /// Slot-define header. Defaults to `src/include/config.h`.
    pub fn entry_header(&self) -> &Path {
        self.file
            .primary
            .entry_header
            .as_deref()
            .unwrap_or(Path::new("src/include/config.h"))
    }

    /// Key header. Defaults to `src/include/conf.h`.
    pub fn key_header(&self) -> &Path {
        self.file
            .primary
            .key_header
            .as_deref()
            .unwrap_or(Path::new("src/include/conf.h"))
    }

    /// Test schema file. Defaults to `dist/test_data.toml`.
    pub fn test_schema(&self) -> &Path {
        self.file
            .test
            .schema
            .as_deref()
            .unwrap_or(Path::new("dist/test_data.toml"))
    }

    /// Test validation tables. Defaults to `src/config/test_config.c`.
    pub fn test_tables(&self) -> &Path {
        self.file
            .test
            .tables
            .as_deref()
            .unwrap_or(Path::new("src/config/test_config.c"))
    }

    /// Symbol prefix. Defaults to `WT`.
    pub fn prefix(&self) -> &str {
        self.file.emit.prefix.as_deref().unwrap_or("WT")
    }

    /// Included header. Defaults to `wt_internal.h`.
    pub fn include(&self) -> &str {
        self.file.emit.include.as_deref().unwrap_or("wt_internal.h")
    }

    /// Banner generator name. Defaults to `apiconf`.
    pub fn generator(&self) -> &str {
        self.file.emit.generator.as_deref().unwrap_or("apiconf")
    }

    /// Documentation marker note. Defaults to the primary schema path.
    pub fn schema_note(&self) -> String {
        match &self.file.emit.schema_note {
            Some(note) => note.clone(),
            None => self.primary_schema().display().to_string(),
        }
    }

    /// Documentation width. Defaults to 100.
    pub fn doc_width(&self) -> usize {
        self.file.emit.doc_width.unwrap_or(100)
    }

    /// Validation record width. Defaults to 80.
    pub fn table_width(&self) -> usize {
        self.file.emit.table_width.unwrap_or(80)
    }

    /// The effective configuration with every default filled in.
    pub fn effective(&self) -> ConfigFile {
        ConfigFile {
            primary: PrimarySection {
                schema: Some(self.primary_schema().to_path_buf()),
                doc_template: Some(self.doc_template().to_path_buf()),
                tables: Some(self.primary_tables().to_path_buf()),
                entry_header: Some(self.entry_header().to_path_buf()),
                key_header: Some(self.key_header().to_path_buf()),
            },
            test: TestSection {
                schema: Some(self.test_schema().to_path_buf()),
                tables: Some(self.test_tables().to_path_buf()),
            },
            emit: EmitSection {
                prefix: Some(self.prefix().to_string()),
                include: Some(self.include().to_string()),
                generator: Some(self.generator().to_string()),
                schema_note: Some(self.schema_note()),
                doc_width: Some(self.doc_width()),
                table_width: Some(self.table_width()),
            },
        }
    }
}
