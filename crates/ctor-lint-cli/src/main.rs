//! ctor-lint CLI tool.
//!
//! Usage:
//! ```bash
//! ctor-lint check [OPTIONS] [PATH]
//! ctor-lint fix [--dry-run] [PATH]
//! ctor-lint list-rules
//! ctor-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Constructor parameter layout linter for Rust
#[derive(Parser)]
#[command(name = "ctor-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CTOR_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated names or codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Lowest severity that makes the command fail
        #[arg(long)]
        fail_on: Option<ctor_lint_core::Severity>,
    },

    /// Apply automatic fixes
    Fix {
        /// Path to fix (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Report what would change without writing files
        #[arg(long)]
        dry_run: bool,

        /// Only run specific rules (comma-separated names or codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Source snippets rendered with miette.
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            rules,
            exclude,
            fail_on,
        } => {
            let config = config_resolver::load(&path, cli.config.as_deref())?;
            let passed = commands::check::run(&path, format, rules, exclude, fail_on, config)?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Fix {
            path,
            dry_run,
            rules,
            exclude,
        } => {
            let config = config_resolver::load(&path, cli.config.as_deref())?;
            commands::fix::run(&path, dry_run, rules, exclude, config)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
