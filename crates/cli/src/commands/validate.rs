use std::path::Path;

use anyhow::{Context, Result};
use builder_core::configs::load_app_config;
use builder_core::BuildSession;
use colored::*;

use crate::plugins;

pub fn execute(file: &Path) -> Result<()> {
    let config = load_app_config(file)?;
    let plugin = plugins::load(&config.build.plugin)?;

    let mut session = BuildSession::new(plugin);
    session
        .configure(&config.build)
        .with_context(|| format!("Invalid build configuration in {}", file.display()))?;

    println!(
        "{} {}",
        "✓".green().bold(),
        format!("Build configuration is valid ({} plugin)", config.build.plugin).green()
    );
    Ok(())
}
