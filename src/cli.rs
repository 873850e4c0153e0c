//! CLI command definitions for pyproject-settings
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Parser, Subcommand};

/// Resolve Django-style settings from a pyproject.toml document
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the pyproject.toml document (default: ./pyproject.toml)
    #[arg(short, long, global = true)]
    pub document: Option<String>,

    /// Keep setting names as written instead of uppercasing them
    #[arg(long, global = true)]
    pub no_upper: bool,

    /// Env variable whose presence activates the docker tier
    #[arg(long, default_value = "DJANGO_ENV", global = true)]
    pub docker_env: String,

    /// Env variable checked against --production-value for the production tier
    #[arg(long, default_value = "DJANGO_ENV", global = true)]
    pub production_env: String,

    /// Value the production env variable must equal
    #[arg(long, default_value = "production", global = true)]
    pub production_value: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve settings and print them as JSON (default if no subcommand given)
    Resolve,

    /// Print the raw parsed document without resolving directives
    Dump,
}
