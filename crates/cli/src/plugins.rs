//! Builder plugins compiled into the CLI

use anyhow::{bail, Result};
use builder_plugin_sbt::{SbtBuilder, PLUGIN_KEY};

pub const KNOWN_PLUGINS: &[&str] = &[PLUGIN_KEY];

/// Look up a plugin by the key used in `build.use`
pub fn load(key: &str) -> Result<SbtBuilder> {
    match key {
        PLUGIN_KEY => Ok(SbtBuilder::new()),
        other => bail!(
            "Unknown builder plugin '{}' (known plugins: {})",
            other,
            KNOWN_PLUGINS.join(", ")
        ),
    }
}
