//! codegen
//!
//! The schema compiler: pure functions from a [`Schema`] to generated text.
//!
//! # Pipeline
//!
//! [`Compilation::new`] runs the whole-schema passes once:
//! 1. [`keys::KeyRegistry`] numbers every option identity
//! 2. [`keys::KeyTree`] merges all option trees by identity
//! 3. [`plan::TablePlan`] orders validation tables and choice arrays
//! 4. [`choices::ChoiceRegistry`] names the choice arrays
//!
//! Every emitter then reads those results without mutating them:
//! - [`tables`] - validation tables and the method entry table
//! - [`docs`] - documentation regions spliced into a template
//! - [`structure`] - slot defines, key defines, and the key structure
//!
//! # Architecture
//!
//! Nothing in this layer touches the filesystem. Callers hand in template
//! text and receive output text; writing it is [`crate::artifact`]'s job.

pub mod choices;
pub mod docs;
pub mod keys;
pub mod plan;
pub mod structure;
pub mod tables;
pub mod wrap;

use thiserror::Error;
use tracing::debug;

use crate::core::config::Config;
use crate::core::schema::Schema;
use crate::core::types::Mode;

use self::choices::ChoiceRegistry;
use self::docs::DocOutput;
use self::keys::{KeyRegistry, KeyRole, KeyTree};
use self::plan::TablePlan;

/// Errors from compiling a schema.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("key '{identity}' is used as a {existing} and as a {found}")]
    KeyKindConflict {
        identity: String,
        existing: KeyRole,
        found: KeyRole,
    },

    #[error("schema needs more than {max} distinct keys")]
    KeyOverflow { max: usize },

    #[error("key path '{path}' is {depth} levels deep, composite keys hold at most {max}")]
    KeyTooDeep {
        path: String,
        depth: usize,
        max: usize,
    },

    #[error("@configstart for '{method}' on line {line} has no @configend")]
    UnterminatedRegion { method: String, line: usize },

    #[error("no key registered for '{0}'")]
    MissingKey(String),

    #[error("'{0}' was not planned")]
    Unplanned(String),

    #[error("invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Text generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Upper-case symbol prefix, e.g. `WT`.
    pub prefix: String,
    /// Header included by the validation tables.
    pub include: String,
    /// Name in the "do not edit" banner.
    pub generator: String,
    /// Pointer written into documentation markers.
    pub schema_note: String,
    /// Documentation line width, comment prefix included.
    pub doc_width: usize,
    /// Validation record line width.
    pub table_width: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl EmitOptions {
    /// Settings from the tool configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefix: config.prefix().to_string(),
            include: config.include().to_string(),
            generator: config.generator().to_string(),
            schema_note: config.schema_note(),
            doc_width: config.doc_width(),
            table_width: config.table_width(),
        }
    }
}

/// A schema with every whole-schema pass done.
#[derive(Debug)]
pub struct Compilation<'s> {
    schema: &'s Schema,
    options: EmitOptions,
    keys: KeyRegistry,
    tree: KeyTree,
    plan: TablePlan<'s>,
    choices: ChoiceRegistry<'s>,
}

impl<'s> Compilation<'s> {
    /// Run the registry, tree, and planning passes.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] on key kind conflicts or key overflow.
    pub fn new(schema: &'s Schema, options: EmitOptions) -> Result<Self, CompileError> {
        let keys = KeyRegistry::build(schema)?;
        let tree = KeyTree::build(schema)?;
        let plan = TablePlan::build(schema);
        let choices = ChoiceRegistry::from_plan(&plan);
        debug!(
            methods = schema.len(),
            keys = keys.len(),
            choice_arrays = choices.len(),
            "compiled schema"
        );

        Ok(Self {
            schema,
            options,
            keys,
            tree,
            plan,
            choices,
        })
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    pub fn keys(&self) -> &KeyRegistry {
        &self.keys
    }

    pub fn tree(&self) -> &KeyTree {
        &self.tree
    }

    pub fn plan(&self) -> &TablePlan<'s> {
        &self.plan
    }

    pub fn choices(&self) -> &ChoiceRegistry<'s> {
        &self.choices
    }

    /// The validation-table source for a mode.
    pub fn tables(&self, mode: Mode) -> Result<String, CompileError> {
        tables::emit(self, mode)
    }

    /// Regenerate every documentation region of a template.
    pub fn docs(&self, template: &str) -> Result<DocOutput, CompileError> {
        docs::emit(self.schema, &self.options, template)
    }

    /// `#define` lines mapping each method to its slot.
    pub fn slot_defines(&self) -> String {
        structure::slot_defines(self.schema, &self.options.prefix)
    }

    /// `#define` lines for every key, then the key count.
    pub fn key_defines(&self) -> String {
        structure::key_defines(&self.keys, &self.options.prefix)
    }

    /// The nested key structure declaration and initializer.
    pub fn key_structure(&self) -> Result<String, CompileError> {
        structure::key_structure(&self.tree, &self.options.prefix)
    }
}
