//! CLI command definitions
//!
//! Thin outer layer over the lifecycle manager; the core exposes no wire
//! format of its own.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TraceKeeper - project lifecycle manager for tracing sessions
#[derive(Parser)]
#[command(name = "tracekeeper", about = "Project lifecycle manager for tracing sessions", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the daemon: load persisted projects, serve until interrupted
    Run,

    /// List persisted projects
    List,

    /// Create a new project and print its id
    Create {
        /// Optional display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Remove a project immediately
    Remove {
        /// Project id
        id: u64,
    },
}
