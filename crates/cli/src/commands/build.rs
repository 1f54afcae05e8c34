use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use builder_core::configs::load_app_config;
use builder_core::ui::{app_color, ConsoleUi};
use builder_core::BuildSession;
use builder_plugin_protocol::BuildContext;
use colored::*;
use tracing::warn;

use crate::plugins;

pub async fn execute(file: &Path, json: bool) -> Result<()> {
    let config = load_app_config(file)?;
    let plugin = plugins::load(&config.build.plugin)?;

    let app_name = config.app.clone().unwrap_or_else(|| "application".to_string());

    // With --json, stdout carries only the artifact; progress goes to stderr
    let mut out: Box<dyn Write + Send> = if json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    writeln!(
        out,
        "┌─ {} {}",
        "Building".bold(),
        app_name.color(app_color(&app_name)).bold()
    )?;
    writeln!(out, "└─ {} {}", "Plugin:".bright_black(), config.build.plugin)?;
    writeln!(out)?;

    let (ctx, cancel) = BuildContext::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling build");
            cancel.cancel();
        }
    });

    let mut session = BuildSession::new(plugin);
    let artifact = session
        .run(&config.build, &ctx, &ConsoleUi::new(out))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build {}: {}", app_name, e))?;

    if json {
        println!("{}", serde_json::to_string(&artifact)?);
    } else {
        println!();
        println!(
            "{} {} {}",
            "✓".green().bold(),
            "Artifact:".green().bold(),
            artifact.path
        );
    }

    Ok(())
}
