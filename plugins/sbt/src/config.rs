//! Build configuration accepted by the sbt plugin, and its validation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// The sbt task the plugin runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SbtCommand {
    /// Build a single fat jar with sbt-assembly.
    Assembly,
    /// Regular build.
    Build,
}

impl SbtCommand {
    pub const ALL: [SbtCommand; 2] = [SbtCommand::Assembly, SbtCommand::Build];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assembly => "assembly",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for SbtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SbtCommand {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedCommand(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The host handed over something that is not an sbt build configuration at all.
    #[error("Expected an sbt build configuration: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("sbt assembly and sbt build are the only supported commands (got \"{0}\")")]
    UnsupportedCommand(String),
}

/// Configuration as it arrives from the host, before validation.
///
/// `command` stays a plain string here so that an unknown verb is reported as a user error
/// rather than as a malformed document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(title = "sbt build configuration")]
pub struct RawBuildConfig {
    /// sbt task to run.
    #[schemars(with = "SbtCommand")]
    pub command: String,
    /// Directory containing the sbt project; sbt is launched from here.
    pub source_dir: PathBuf,
    /// Directory the jar is written to.
    pub output_dir: String,
    /// File name of the jar inside `output_dir`.
    pub file_name: String,
}

/// A validated build configuration.
///
/// Directories are not checked for existence; sbt reports a missing project itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub command: SbtCommand,
    pub source_dir: PathBuf,
    pub output_dir: String,
    pub file_name: String,
}

impl BuildConfig {
    /// Parse and validate an untyped configuration value.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Shape`] if the value does not have the expected fields, and
    /// [`ConfigError::UnsupportedCommand`] if `command` is not a known sbt task.
    pub fn from_value(value: JsonValue) -> Result<Self, ConfigError> {
        let raw: RawBuildConfig = serde_json::from_value(value)?;
        Self::try_from(raw)
    }

    /// Where the jar is expected to land: `output_dir` and `file_name` joined by `/`.
    ///
    /// This is a plain concatenation; no normalization happens.
    #[must_use]
    pub fn artifact_path(&self) -> String {
        format!("{}/{}", self.output_dir, self.file_name)
    }
}

impl TryFrom<RawBuildConfig> for BuildConfig {
    type Error = ConfigError;

    fn try_from(raw: RawBuildConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            command: raw.command.parse()?,
            source_dir: raw.source_dir,
            output_dir: raw.output_dir,
            file_name: raw.file_name,
        })
    }
}

/// JSON Schema for [`RawBuildConfig`].
#[must_use]
pub fn config_schema() -> Option<JsonValue> {
    serde_json::to_value(schemars::schema_for!(RawBuildConfig)).ok()
}
