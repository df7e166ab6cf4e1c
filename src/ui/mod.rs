//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Every line meant for the user goes through this module so the quiet
//! and debug flags behave the same in every command.

pub mod output;
