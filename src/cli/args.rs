//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// pathmend - Windows PATH repair and verification.
#[derive(Debug, Parser)]
#[command(name = "pathmend")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to settings file (overrides default ./pathmend.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Emit results as JSON instead of styled text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show stored PATH values per scope (default if no command specified)
    Status(StatusArgs),

    /// Run three-tier verification for catalog tools
    Verify(VerifyArgs),

    /// Diagnose and repair PATH drift for catalog tools
    Repair(RepairArgs),

    /// Add a directory to a scope's PATH
    Add(AddArgs),

    /// Remove a directory from a scope's PATH
    Remove(RemoveArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {}

/// Arguments for the `verify` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct VerifyArgs {
    /// Verify only this tool (command name, e.g. "claude")
    pub tool: Option<String>,
}

/// Arguments for the `repair` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RepairArgs {
    /// Repair only this tool (command name)
    pub tool: Option<String>,

    /// Apply proposed plans without confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Show proposed plans without applying anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `add` command.
#[derive(Debug, Clone, clap::Args)]
pub struct AddArgs {
    /// Directory to put on PATH
    pub directory: String,

    /// Target Machine scope instead of User (needs elevation)
    #[arg(long)]
    pub machine: bool,
}

/// Arguments for the `remove` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RemoveArgs {
    /// Directory to remove from PATH
    pub directory: String,

    /// Target Machine scope instead of User (needs elevation)
    #[arg(long)]
    pub machine: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
