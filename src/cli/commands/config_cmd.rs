//! config command - Print the effective tool configuration

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Print the effective configuration, defaults filled in, as TOML.
pub fn config(ctx: &Context) -> Result<()> {
    let effective = ctx.config.effective();
    let text = toml::to_string_pretty(&effective).context("Failed to serialize configuration")?;

    match ctx.config.loaded_from() {
        Some(path) => println!("# loaded from {}", path.display()),
        None => println!("# built-in defaults"),
    }
    print!("{text}");
    Ok(())
}
