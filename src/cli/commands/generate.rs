//! generate command - Regenerate (or check) every artifact of a mode

use crate::artifact::render::render;
use crate::artifact::{ArtifactError, ArtifactWriter};
use crate::cli::Context;
use crate::core::types::Mode;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Regenerate every artifact for `mode`.
///
/// With `check`, nothing is written and stale files produce an
/// [`ArtifactError::Stale`] error.
pub fn generate(ctx: &Context, mode: Mode, check: bool) -> Result<()> {
    let rendered = render(&ctx.paths, &ctx.config, mode)
        .with_context(|| format!("Failed to generate {mode} configuration"))?;

    for method in &rendered.missing_methods {
        output::warn(
            format!("{method}: configuration method not found in the schema"),
            ctx.verbosity,
        );
    }

    let writer = if check {
        ArtifactWriter::check_only()
    } else {
        ArtifactWriter::new()
    };

    let mut stale = Vec::new();
    for artifact in &rendered.artifacts {
        let outcome = writer
            .commit(artifact)
            .with_context(|| format!("Failed to commit {}", artifact.path.display()))?;
        output::outcome(&artifact.path, outcome, ctx.verbosity);
        if !outcome.is_current() {
            stale.push(artifact.path.clone());
        }
    }

    if !stale.is_empty() {
        return Err(ArtifactError::Stale(stale).into());
    }
    if check {
        output::print(format!("{mode} configuration is up to date"), ctx.verbosity);
    }
    Ok(())
}

/// Check that the artifacts of `mode` are current.
pub fn check(ctx: &Context, mode: Mode) -> Result<()> {
    generate(ctx, mode, true)
}
