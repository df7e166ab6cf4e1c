//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Project root (default: current directory)
//! - `--config <file>`: Tool configuration file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// apiconf - Compile an API configuration schema into C tables, keys and docs
#[derive(Parser, Debug)]
#[command(name = "apiconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project root; relative paths in the configuration resolve against it
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Tool configuration file (default: $APICONF_CONFIG, then ./apiconf.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Regenerate every artifact from the schema
    #[command(long_about = "Regenerate every artifact from the schema.\n\n\
        The primary run rewrites the documentation template, the validation \
        tables, and the generated sections of the entry and key headers. \
        With --test, only the test validation tables are written.\n\n\
        All output is built before anything is written. Files whose content \
        would not change are left untouched.")]
    Generate {
        /// Generate the test configuration surface instead
        #[arg(long)]
        test: bool,

        /// Only report out-of-date files; exit 1 if any
        #[arg(long)]
        check: bool,
    },

    /// Check that generated files are up to date (same as generate --check)
    Check {
        /// Check the test configuration surface instead
        #[arg(long)]
        test: bool,
    },

    /// Print the key registry
    Keys {
        /// Read the test schema instead
        #[arg(long)]
        test: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print method slots
    Slots {
        /// Read the test schema instead
        #[arg(long)]
        test: bool,
    },

    /// Print the effective tool configuration as TOML
    Config,

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts.\n\n\
        Examples:\n\n\
        # Bash\n\
        apiconf completion bash > ~/.local/share/bash-completion/completions/apiconf\n\n\
        # Zsh\n\
        apiconf completion zsh > ~/.zfunc/_apiconf\n\n\
        # Fish\n\
        apiconf completion fish > ~/.config/fish/completions/apiconf.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
