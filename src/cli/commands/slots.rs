//! slots command - Print each method's entry slot

use crate::cli::Context;
use crate::core::schema::Schema;
use crate::core::types::Mode;
use anyhow::{Context as _, Result};

/// Print `slot method` for every method, in slot order.
pub fn slots(ctx: &Context, mode: Mode) -> Result<()> {
    let path = ctx.paths.schema(&ctx.config, mode);
    let schema = Schema::load(&path).context("Failed to load schema")?;

    for (slot, method) in schema.slots() {
        println!("{slot:>4}  {}", method.name);
    }
    Ok(())
}
