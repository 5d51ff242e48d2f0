//! Command-line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Validate form field values against declarative rule chains.
#[derive(Parser, Debug)]
#[command(name = "fieldcheck")]
#[command(version)]
#[command(about = "Validate form field values against declarative rule chains")]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every form of a JSON form definition
    Check {
        /// Path to the form definition
        file: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate one rule chain against one value
    Eval {
        /// Rule chain, e.g. "required|minLen:3"
        rules: String,
        /// Value to check; omitted means no value at all
        value: Option<String>,
    },
}
