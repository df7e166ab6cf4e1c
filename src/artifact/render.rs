//! artifact::render
//!
//! Builds every artifact of one run in memory.
//!
//! Nothing is written here: a run that fails halfway leaves every
//! destination untouched because the writer only sees complete output.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use super::fragment::replace_fragment;
use super::{read, Artifact, ArtifactError};
use crate::codegen::{Compilation, CompileError, EmitOptions};
use crate::core::config::Config;
use crate::core::paths::ProjectPaths;
use crate::core::schema::{Schema, SchemaError};
use crate::core::types::Mode;

/// Entry header fragment holding the slot defines.
pub const SLOT_FRAGMENT: &str = "configuration section";
/// Key header fragment holding the key defines.
pub const KEY_FRAGMENT: &str = "API configuration keys";
/// Key header fragment holding the key structure.
pub const STRUCTURE_FRAGMENT: &str = "Configuration key structure";

/// Errors from building a run's artifacts.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Everything one run will commit.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub mode: Mode,
    /// Artifacts in commit order.
    pub artifacts: Vec<Artifact>,
    /// Template markers naming methods the schema lacks.
    pub missing_methods: Vec<String>,
}

/// Load the schema for `mode` and build its artifacts.
///
/// Primary mode yields the documentation template, the validation tables,
/// the entry header and the key header. Test mode yields only its tables.
///
/// # Errors
///
/// Fails on schema faults, compile errors, unreadable inputs, or a header
/// missing one of its fragments.
pub fn render(paths: &ProjectPaths, config: &Config, mode: Mode) -> Result<Rendered, RenderError> {
    let schema = Schema::load(&paths.schema(config, mode))?;
    render_schema(&schema, paths, config, mode)
}

/// Build the artifacts of an already loaded schema.
///
/// # Errors
///
/// As [`render`], minus schema loading.
pub fn render_schema(
    schema: &Schema,
    paths: &ProjectPaths,
    config: &Config,
    mode: Mode,
) -> Result<Rendered, RenderError> {
    let compilation = Compilation::new(schema, EmitOptions::from_config(config))?;
    let mut rendered = Rendered {
        mode,
        artifacts: Vec::new(),
        missing_methods: Vec::new(),
    };

    if mode == Mode::Primary {
        let template_path = paths.doc_template(config);
        let docs = compilation.docs(&read(&template_path)?)?;
        debug!(regions = docs.regions, missing = docs.missing.len(), "rendered docs");
        rendered.missing_methods = docs.missing;
        rendered.artifacts.push(Artifact::new(template_path, docs.text));
    }

    rendered.artifacts.push(Artifact::new(
        paths.tables(config, mode),
        compilation.tables(mode)?,
    ));

    if mode == Mode::Primary {
        let entry_path = paths.entry_header(config);
        let entry = splice(
            &entry_path,
            &read(&entry_path)?,
            SLOT_FRAGMENT,
            &compilation.slot_defines(),
        )?;
        rendered.artifacts.push(Artifact::new(entry_path, entry));

        let key_path = paths.key_header(config);
        let keys = splice(
            &key_path,
            &read(&key_path)?,
            KEY_FRAGMENT,
            &compilation.key_defines(),
        )?;
        let keys = splice(
            &key_path,
            &keys,
            STRUCTURE_FRAGMENT,
            &compilation.key_structure()?,
        )?;
        rendered.artifacts.push(Artifact::new(key_path, keys));
    }

    debug!(%mode, artifacts = rendered.artifacts.len(), "rendered run");
    Ok(rendered)
}

fn splice(path: &Path, text: &str, fragment: &str, body: &str) -> Result<String, ArtifactError> {
    replace_fragment(text, fragment, body).ok_or_else(|| ArtifactError::MissingFragment {
        path: path.to_path_buf(),
        fragment: fragment.to_string(),
    })
}
