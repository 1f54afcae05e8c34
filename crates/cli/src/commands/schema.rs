use std::io;

use anyhow::Result;
use builder_core::configs::app_config_schema;
use builder_core::BuildSession;

use crate::plugins;

pub fn execute(plugin_key: &str, app: bool) -> Result<()> {
    let schema = if app {
        app_config_schema()
    } else {
        let session = BuildSession::new(plugins::load(plugin_key)?);
        session.schema().unwrap_or(serde_json::Value::Null)
    };

    serde_json::to_writer_pretty(io::stdout(), &schema)?;
    println!();
    Ok(())
}
