//! apiconf - A configuration-schema compiler
//!
//! apiconf reads a declarative schema of API methods and their configuration
//! options and generates everything a C library needs to validate and
//! document them: validation tables with deduplicated choice arrays, a
//! method entry table, numeric key defines with a nested key structure, and
//! documentation regions spliced into a header template.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates)
//! - [`core`] - Domain types, schema model, configuration, paths
//! - [`codegen`] - Pure schema-to-text compilation
//! - [`artifact`] - Reading inputs and committing generated files
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! apiconf maintains the following invariants:
//!
//! 1. The same schema always produces byte-identical output
//! 2. Every key identity maps to exactly one ID, and IDs are dense from 0
//! 3. No file is written until every artifact of a run has been generated
//! 4. A file whose content would not change is never rewritten

pub mod artifact;
pub mod cli;
pub mod codegen;
pub mod core;
pub mod ui;
