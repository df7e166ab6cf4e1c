//! artifact
//!
//! Generated files and the writer that commits them.
//!
//! # Modules
//!
//! - [`fragment`] - splicing text between `BEGIN`/`END` marker lines
//! - [`render`] - every artifact of one run, built before any write
//!
//! # Writes
//!
//! Each artifact is written to a [`tempfile::NamedTempFile`] in the
//! destination's own directory, synced, then persisted over the
//! destination. A failure at any step drops the temporary and leaves the
//! destination as it was. Content identical to what is on disk is never
//! rewritten.
//!
//! A replaced file keeps its permissions; a new one is created with
//! [`NEW_FILE_MODE`] on Unix.

pub mod fragment;
pub mod render;

use std::fmt;
use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Mode of newly created artifacts; temporaries start out owner-only.
#[cfg(unix)]
pub const NEW_FILE_MODE: u32 = 0o644;

/// Errors from reading or committing artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' has no '{fragment}' section")]
    MissingFragment { path: PathBuf, fragment: String },

    #[error("{} generated file(s) out of date: {}", .0.len(), display_paths(.0))]
    Stale(Vec<PathBuf>),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One generated file, complete in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Destination path.
    pub path: PathBuf,
    /// Full new content.
    pub contents: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// What committing an artifact did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The file did not exist and was written.
    Created,
    /// The file existed with different content and was replaced.
    Updated,
    /// The file already held this content.
    Unchanged,
    /// Check mode: the file differs from what would be generated.
    Stale,
}

impl Outcome {
    /// Whether the file on disk matches the generated content afterwards.
    pub fn is_current(&self) -> bool {
        !matches!(self, Outcome::Stale)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Unchanged => "unchanged",
            Outcome::Stale => "stale",
        };
        write!(f, "{}", s)
    }
}

/// Commits artifacts, or only compares them in check mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactWriter {
    check: bool,
}

impl ArtifactWriter {
    /// A writer that replaces out-of-date files.
    pub fn new() -> Self {
        Self { check: false }
    }

    /// A writer that never touches the filesystem beyond reading.
    pub fn check_only() -> Self {
        Self { check: true }
    }

    /// Commit one artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::ReadError`] if the existing file cannot be
    /// read and [`ArtifactError::WriteError`] if the replacement cannot be
    /// written or persisted.
    pub fn commit(&self, artifact: &Artifact) -> Result<Outcome, ArtifactError> {
        let existing = read_existing(&artifact.path)?;
        let outcome = match existing {
            Some(ref current) if *current == artifact.contents => Outcome::Unchanged,
            _ if self.check => Outcome::Stale,
            Some(_) => {
                replace(&artifact.path, &artifact.contents)?;
                Outcome::Updated
            }
            None => {
                replace(&artifact.path, &artifact.contents)?;
                Outcome::Created
            }
        };
        debug!(path = %artifact.path.display(), %outcome, "committed artifact");
        Ok(outcome)
    }

    /// Commit every artifact, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first read or write failure. In check mode, returns
    /// [`ArtifactError::Stale`] listing every stale file once all have
    /// been compared.
    pub fn commit_all(&self, artifacts: &[Artifact]) -> Result<Vec<Outcome>, ArtifactError> {
        let outcomes = artifacts
            .iter()
            .map(|artifact| self.commit(artifact))
            .collect::<Result<Vec<_>, _>>()?;

        let stale: Vec<PathBuf> = artifacts
            .iter()
            .zip(&outcomes)
            .filter(|(_, outcome)| !outcome.is_current())
            .map(|(artifact, _)| artifact.path.clone())
            .collect();
        if !stale.is_empty() {
            return Err(ArtifactError::Stale(stale));
        }
        Ok(outcomes)
    }
}

/// Read a file the run depends on.
///
/// # Errors
///
/// Returns [`ArtifactError::ReadError`] if the file cannot be read.
pub fn read(path: &Path) -> Result<String, ArtifactError> {
    fs::read_to_string(path).map_err(|source| ArtifactError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn read_existing(path: &Path) -> Result<Option<String>, ArtifactError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ArtifactError::ReadError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn replace(path: &Path, contents: &str) -> Result<(), ArtifactError> {
    let write_error = |source| ArtifactError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let permissions = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(source) => return Err(write_error(source)),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    if let Some(permissions) = permissions.or_else(new_file_permissions) {
        file.as_file()
            .set_permissions(permissions)
            .map_err(write_error)?;
    }
    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    Some(Permissions::from_mode(NEW_FILE_MODE))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
