//! keys command - Print the key registry

use crate::cli::Context;
use crate::codegen::keys::KeyRegistry;
use crate::core::schema::Schema;
use crate::core::types::Mode;
use anyhow::{Context as _, Result};

/// Print every key identity with its ID and role, sorted by identity.
pub fn keys(ctx: &Context, mode: Mode, json: bool) -> Result<()> {
    let path = ctx.paths.schema(&ctx.config, mode);
    let schema = Schema::load(&path).context("Failed to load schema")?;
    let registry = KeyRegistry::build(&schema).context("Failed to number keys")?;

    if json {
        let entries: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = registry
        .iter()
        .map(|entry| entry.identity.as_str().len())
        .max()
        .unwrap_or(0);
    for entry in registry.iter() {
        println!(
            "{:<width$}  {:>5}  {}",
            entry.identity.as_str(),
            entry.id,
            entry.role,
        );
    }
    Ok(())
}
