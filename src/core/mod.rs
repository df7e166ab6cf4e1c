//! core
//!
//! Core domain types, schemas, and tool configuration for apiconf.
//!
//! # Modules
//!
//! - [`types`] - Strong types: MethodName, OptionName, KeyIdentity, Mode
//! - [`naming`] - C identifier derivation and escaping
//! - [`schema`] - Schema model, validation, and loading
//! - [`config`] - Tool configuration schema and loading
//! - [`paths`] - Centralized path routing for inputs and artifacts
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing here generates output text

pub mod config;
pub mod naming;
pub mod paths;
pub mod schema;
pub mod types;
