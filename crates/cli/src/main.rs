use std::io;
use std::path::PathBuf;

use anyhow::Result;
use builder_core::configs::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod plugins;

/// builder - Build applications with builder plugins
#[derive(Parser)]
#[command(name = "builder")]
#[command(about = "Build an application with its configured builder plugin")]
#[command(version)]
struct Cli {
    /// Path to the app configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the build configuration without building
    Validate,
    /// Print a JSON Schema
    Schema {
        /// Plugin whose configuration schema to print
        #[arg(long, default_value = builder_plugin_sbt::PLUGIN_KEY)]
        plugin: String,
        /// Print the schema of the app configuration file instead
        #[arg(long, conflicts_with = "plugin")]
        app: bool,
    },
    /// Run the build
    Build {
        /// Print the resulting artifact as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BUILDER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate => commands::validate::execute(&cli.file),
        Commands::Schema { plugin, app } => commands::schema::execute(&plugin, app),
        Commands::Build { json } => commands::build::execute(&cli.file, json).await,
    }
}
