//! Core traits for implementing builder plugins.
//!
//! This module defines the traits on both sides of the plugin boundary:
//! - [`BuilderPlugin`] - Implemented by plugins: metadata, configuration hooks, and the build itself
//! - [`TerminalUi`] and [`Status`] - Implemented by hosts: the UI sink a plugin reports progress to

use std::future::Future;

use serde_json::Value as JsonValue;

use crate::context::BuildContext;
use crate::types::{Artifact, StepStyle};

/// A live status region in the host's UI.
///
/// **Purpose**: Plugins open one status per long-running operation, update its headline while
/// working, and emit finished steps as individual lines.
///
/// Implementations should tolerate `close()` being called more than once.
pub trait Status: Send {
    /// Replace the headline text of this status.
    fn update(&mut self, message: &str);

    /// Emit a finished line with the given style.
    fn step(&mut self, style: StepStyle, message: &str);

    /// Finish the status. No further output is expected afterwards.
    fn close(&mut self);
}

/// The UI sink supplied by the host.
///
/// ```rust
/// # use builder_plugin_protocol::{Status, StepStyle, TerminalUi};
/// struct Silent;
///
/// impl Status for Silent {
///     fn update(&mut self, _: &str) {}
///     fn step(&mut self, _: StepStyle, _: &str) {}
///     fn close(&mut self) {}
/// }
///
/// impl TerminalUi for Silent {
///     fn status(&self) -> Box<dyn Status + '_> {
///         Box::new(Silent)
///     }
/// }
/// ```
pub trait TerminalUi: Send + Sync {
    /// Open a new status region.
    fn status(&self) -> Box<dyn Status + '_>;
}

/// The main plugin trait: metadata plus the three lifecycle hooks a host calls.
///
/// **Lifecycle**: The host calls the hooks in a fixed order:
/// 1. [`configuration_options`](Self::configuration_options) - describe the accepted configuration
/// 2. [`config_set`](Self::config_set) - hand over the user's configuration for validation
/// 3. [`build`](Self::build) - run the build with the accepted configuration
///
/// A rejected `config_set` ends the lifecycle; `build` must not be called afterwards, and
/// plugins must refuse to build when no configuration was accepted.
pub trait BuilderPlugin {
    /// Return the human-readable name of this plugin.
    ///
    /// Displayed to users in logs and error messages, e.g. `"sbt Builder"`.
    fn name(&self) -> &str;

    /// Return the unique identifier for this plugin.
    ///
    /// This is the value users put in the `use:` field of their app configuration. It must
    /// contain no whitespace; see [`PluginKey`](crate::PluginKey).
    fn key(&self) -> &str;

    /// Return a JSON Schema describing the configuration this plugin accepts.
    ///
    /// Hosts use it for documentation and editor tooling only; validation is always done by
    /// [`config_set`](Self::config_set).
    fn configuration_options(&self) -> Option<JsonValue> {
        None
    }

    /// Validate and store the user's configuration.
    ///
    /// The value arrives untyped. Implementations must reject both values of the wrong shape
    /// and values that are well-formed but semantically invalid, without side effects.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error that the host surfaces to the user as-is.
    fn config_set(&mut self, config: JsonValue) -> anyhow::Result<()>;

    /// Run the build and return the produced artifact.
    ///
    /// Progress is reported through `ui`. When `ctx` is cancelled, implementations should stop
    /// any work they started (including child processes) and return an error.
    ///
    /// # Errors
    ///
    /// Any failure ends the host's pipeline; there is no partial success.
    fn build(
        &self,
        ctx: &BuildContext,
        ui: &dyn TerminalUi,
    ) -> impl Future<Output = anyhow::Result<Artifact>> + Send;
}
