//! Core types for the builder plugin protocol.
//!
//! This module contains the data structures exchanged between the host and a builder plugin:
//! - [`StepStyle`] - How a single status line is rendered
//! - [`Artifact`] - The value a successful build hands back to the host pipeline
//! - [`PluginKey`] - Type-safe plugin identifier

use serde::{Deserialize, Serialize};

/// Rendering style for a single status line emitted during a build.
///
/// The host decides what each style looks like (colors, glyphs). Plugins only pick the style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStyle {
    /// The line belongs to a step that completed successfully.
    Ok,
    /// The line belongs to a step that failed.
    Error,
}

impl StepStyle {
    /// Pick the style for output produced by a step with the given outcome.
    #[must_use]
    pub const fn for_outcome(succeeded: bool) -> Self {
        if succeeded {
            Self::Ok
        } else {
            Self::Error
        }
    }
}

/// The result of a successful build.
///
/// **Purpose**: Returned from [`BuilderPlugin::build`](crate::BuilderPlugin::build) and made
/// available to later pipeline stages (for example a deploy step) by the host.
///
/// The path is the location where the build tool was asked to place its output. The protocol
/// makes no promise that a file exists there; that is between the plugin and its build tool.
///
/// ```rust
/// # use builder_plugin_protocol::Artifact;
/// let artifact = Artifact::new("dist/service.jar");
/// let json = serde_json::to_string(&artifact).unwrap();
/// assert_eq!(json, r#"{"path":"dist/service.jar"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Filesystem path of the built artifact.
    pub path: String,
}

impl Artifact {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Type-safe identifier for plugins.
///
/// The key is what users write in the `use:` field of their app configuration, so it must
/// not contain whitespace.
///
/// ```rust
/// # use builder_plugin_protocol::PluginKey;
/// let key = PluginKey::new("sbt").unwrap();
/// assert_eq!(key.as_str(), "sbt");
///
/// assert!(PluginKey::new("my plugin").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginKey(String);

impl PluginKey {
    /// Create a new `PluginKey` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or contains whitespace characters.
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.is_empty() {
            return Err("Plugin key must not be empty".to_string());
        }
        if key.chars().any(char::is_whitespace) {
            return Err(format!(
                "Plugin key '{}' contains whitespace characters",
                key
            ));
        }
        Ok(Self(key))
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PluginKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PluginKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
