//! Pyproject Settings CLI
//!
//! Loads Django-style settings from a pyproject.toml document and prints
//! the resolved mapping as JSON.

use anyhow::Result;
use clap::Parser;
use pyproject_settings::cli::{Cli, Command};
use pyproject_settings::settings::SettingsLoader;
use std::fs::OpenOptions;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let mut loader = SettingsLoader::new()
        .with_upper(!cli.no_upper)
        .with_docker_env(cli.docker_env.as_str())
        .with_production_env(cli.production_env.as_str(), cli.production_value.as_str());
    if let Some(document) = &cli.document {
        loader = loader.with_path(document);
    }
    debug!(path = %loader.document_path().display(), "loading document");

    match cli.command.unwrap_or(Command::Resolve) {
        Command::Resolve => {
            let settings = loader.load()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Dump => {
            let document = loader.load_document()?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}
