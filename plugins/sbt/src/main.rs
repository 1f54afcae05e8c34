use std::io::{self, Read};

use anyhow::{Context, Result};
use builder_plugin_protocol::{BuildContext, BuildMessage, BuilderPlugin, JsonLinesUi};
use builder_plugin_sbt::SbtBuilder;
use clap::{Parser, Subcommand};
use serde_json::{json, Value as JsonValue};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "sbt builder plugin", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the configuration JSON Schema
    ConfigSchema,
    /// Validate a configuration read from stdin
    ConfigSet,
    /// Validate a configuration read from stdin and run the build
    ///
    /// Status events are written to stdout as JSON lines, followed by the artifact.
    Build,
}

fn read_config() -> Result<JsonValue> {
    let mut stdin = String::new();
    io::stdin()
        .read_to_string(&mut stdin)
        .context("Failed to read configuration from stdin")?;
    serde_json::from_str(&stdin).context("Configuration on stdin is not valid JSON")
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
    let mut plugin = SbtBuilder::new();

    match cli.command {
        Commands::ConfigSchema => {
            let schema = plugin.configuration_options().unwrap_or(JsonValue::Null);
            serde_json::to_writer(io::stdout(), &schema)?;
        }
        Commands::ConfigSet => {
            plugin.config_set(read_config()?)?;
            // Explicit null signals an accepted configuration
            serde_json::to_writer(io::stdout(), &json!(null))?;
        }
        Commands::Build => {
            plugin.config_set(read_config()?)?;

            let (ctx, cancel) = BuildContext::new();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });

            let ui = JsonLinesUi::new(io::stdout());
            let artifact = plugin.build(&ctx, &ui).await?;
            ui.emit(&BuildMessage { artifact });
        }
    }

    Ok(())
}
