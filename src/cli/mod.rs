//! cli
//!
//! Command-line interface layer for apiconf.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Resolve the project root and tool configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Schema compilation lives in [`crate::codegen`]
//! and every file write goes through [`crate::artifact`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::{Context as _, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::Config;
use crate::core::paths::ProjectPaths;
use crate::ui::output::Verbosity;

/// Everything a command handler needs from the global flags.
#[derive(Debug)]
pub struct Context {
    /// Project root and derived paths.
    pub paths: ProjectPaths,
    /// Effective tool configuration.
    pub config: Config,
    pub verbosity: Verbosity,
}

impl Context {
    /// Resolve the project root and load its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the current directory is unavailable or the configuration
    /// file cannot be loaded.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = match &cli.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        let paths = ProjectPaths::new(root);
        let config = Config::load(paths.root(), cli.config.as_deref())
            .context("Failed to load configuration")?;
        if let Some(path) = config.loaded_from() {
            tracing::debug!(path = %path.display(), "loaded configuration");
        }

        Ok(Self {
            paths,
            config,
            verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        })
    }
}

/// Route `tracing` events to stderr.
///
/// `RUST_LOG` wins when set; otherwise `--debug` enables this crate's
/// debug events and everything else stays at `warn`.
pub fn init_tracing(debug: bool) {
    let fallback = if debug { "warn,apiconf=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    // Completion needs no project.
    if let args::Command::Completion { shell } = cli.command {
        return commands::completion(shell);
    }

    let ctx = Context::from_cli(&cli)?;
    commands::dispatch(cli.command, &ctx)
}
