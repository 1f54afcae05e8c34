use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{BuilderError, BuilderResult};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the application
    pub app: Option<String>,
    pub build: BuildStanza,
}

/// Which builder plugin to use and the configuration handed to it.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct BuildStanza {
    /// Plugin key, e.g. `sbt`
    #[serde(rename = "use")]
    pub plugin: String,
    /// Opaque to the host; validated by the plugin.
    #[serde(default)]
    pub config: serde_json::Value,
}

pub fn parse_app_config(yaml_str: &str) -> BuilderResult<AppConfig> {
    let config: AppConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

pub fn load_app_config(path: &Path) -> BuilderResult<AppConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        BuilderError::Config(format!(
            "Failed to read app config {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_app_config(&content).map_err(|e| {
        BuilderError::Config(format!(
            "Failed to parse app config {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"
app: billing
build:
  use: sbt
  config:
    command: assembly
    source_dir: ./service
    output_dir: ./dist
    file_name: billing.jar
"#;

    #[test]
    fn parses_plugin_key_and_opaque_config() {
        let config = parse_app_config(SAMPLE).unwrap();
        assert_eq!(config.app.as_deref(), Some("billing"));
        assert_eq!(config.build.plugin, "sbt");
        assert_eq!(
            config.build.config,
            json!({
                "command": "assembly",
                "source_dir": "./service",
                "output_dir": "./dist",
                "file_name": "billing.jar",
            })
        );
    }

    #[test]
    fn rejects_unknown_top_level_keys() {
        let yaml = "build:\n  use: sbt\ndeploy:\n  use: docker\n";
        assert!(matches!(
            parse_app_config(yaml),
            Err(BuilderError::Yaml(_))
        ));
    }

    #[test]
    fn missing_plugin_config_defaults_to_null() {
        let config = parse_app_config("build:\n  use: sbt\n").unwrap();
        assert!(config.build.config.is_null());
    }

    #[test]
    fn load_reports_the_offending_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("builder.yml");
        let err = load_app_config(&missing).unwrap_err();
        assert!(err.to_string().contains("builder.yml"));

        std::fs::write(&missing, SAMPLE).unwrap();
        assert!(load_app_config(&missing).is_ok());
    }
}
