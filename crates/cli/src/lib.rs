//! # SchemaForge CLI
//!
//! Command-line interface for SchemaForge.
//!
//! ## Commands
//!
//! - `make` - Generate a migration from a name and a schema string
//! - `pivot` - Generate a pivot table migration for two tables
//! - `inspect` - Show how a migration name and schema are interpreted
//!

pub mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use forge_codegen::{GeneratorConfig, ModifierPolicy, VerbFallback};
use forge_core::ForgeError;
use std::path::{Path, PathBuf};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

/// Generate Laravel migrations from a migration name and a compact schema
#[derive(Parser, Debug)]
#[command(name = "schemaforge", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to schemaforge.toml in the project directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Drop unknown schema modifiers instead of failing
    #[arg(long, global = true)]
    pub ignore_unknown_modifiers: bool,

    /// Fail on migration names that do not start with a known verb
    #[arg(long, global = true)]
    pub strict_verbs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a migration
    Make(MakeArgs),

    /// Generate a pivot table migration joining two tables
    Pivot(PivotArgs),

    /// Print the parsed intent, fields and rendered schema
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct MakeArgs {
    /// Migration name, e.g. add_views_to_posts_table
    pub name: String,

    /// Schema string, e.g. "views:integer:unsigned, title:string:100:nullable"
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Also generate an Eloquent model
    #[arg(long)]
    pub model: bool,

    /// Laravel project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Replace an existing migration with the same name
    #[arg(long)]
    pub force: bool,

    /// Print the generated files instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct PivotArgs {
    /// First table, e.g. posts
    pub first: String,

    /// Second table, e.g. tags
    pub second: String,

    /// Laravel project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Print the generated file instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Migration name
    pub name: String,

    /// Schema string
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse the process arguments, exiting with usage on error
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Load the configuration for a project directory and apply the global
    /// flags on top of it.
    pub fn load_config(&self, project_dir: &Path) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?,
            None => GeneratorConfig::discover(project_dir).context("failed to load configuration")?,
        };

        if self.ignore_unknown_modifiers {
            config.modifier_policy = ModifierPolicy::Ignore;
        }
        if self.strict_verbs {
            config.verb_fallback = VerbFallback::Reject;
        }

        Ok(config)
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Run a parsed command line
pub fn run(cli: &Cli) -> Result<()> {
    tracing::debug!(command = ?cli.command, "running command");

    match &cli.command {
        Command::Make(args) => commands::make(cli, args),
        Command::Pivot(args) => commands::pivot(cli, args),
        Command::Inspect(args) => commands::inspect(cli, args),
    }
}

/// Print an error and its causes to stderr
pub fn report(error: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), error);
    if let Some(hint) = hint(error) {
        eprintln!("  {} {}", "hint:".cyan().bold(), hint);
    }
}

/// Follow-up advice for the compiler errors a user can act on
pub fn hint(error: &anyhow::Error) -> Option<&'static str> {
    let cause = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ForgeError>())?;

    match cause {
        ForgeError::MigrationExists(_) => Some("pass --force to replace it"),
        ForgeError::UnsupportedModifier { .. } => {
            Some("pass --ignore-unknown-modifiers to drop modifiers it does not know")
        }
        ForgeError::InvalidName { .. } | ForgeError::MalformedField { .. } => {
            Some("run `schemaforge inspect <name> -s <schema>` to see how the input is read")
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
