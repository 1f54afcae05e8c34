//! Drives a builder plugin through its lifecycle
//!
//! The host side of the protocol: configuration is validated once via `config_set`, and only
//! an accepted configuration may be built. Errors from the plugin are mapped into
//! [`BuilderError`] so the CLI can report them uniformly.

use builder_plugin_protocol::{Artifact, BuildContext, BuilderPlugin, PluginKey, TerminalUi};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::configs::BuildStanza;
use crate::types::{BuilderError, BuilderResult};

/// A plugin together with the state of its lifecycle
pub struct BuildSession<P> {
    plugin: P,
    configured: bool,
}

impl<P: BuilderPlugin> BuildSession<P> {
    pub fn new(plugin: P) -> Self {
        Self {
            plugin,
            configured: false,
        }
    }

    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// The `Config` hook: the plugin's JSON Schema, if it publishes one
    pub fn schema(&self) -> Option<JsonValue> {
        self.plugin.configuration_options()
    }

    /// The `ConfigSet` hook
    pub fn configure(&mut self, stanza: &BuildStanza) -> BuilderResult<()> {
        self.configured = false;

        let requested = PluginKey::new(stanza.plugin.as_str()).map_err(BuilderError::Plugin)?;
        if requested.as_str() != self.plugin.key() {
            return Err(BuilderError::Plugin(format!(
                "Configuration asks for plugin '{}' but '{}' is loaded",
                requested,
                self.plugin.key()
            )));
        }

        self.plugin
            .config_set(stanza.config.clone())
            .map_err(|e| BuilderError::Config(format!("{e:#}")))?;

        debug!(plugin = self.plugin.key(), "configuration accepted");
        self.configured = true;
        Ok(())
    }

    /// The `BuildFunc` hook. Refuses to run without an accepted configuration.
    pub async fn build(&self, ctx: &BuildContext, ui: &dyn TerminalUi) -> BuilderResult<Artifact> {
        if !self.configured {
            return Err(BuilderError::Build(format!(
                "Plugin '{}' has no accepted configuration",
                self.plugin.key()
            )));
        }

        info!(plugin = self.plugin.key(), "starting build");
        match self.plugin.build(ctx, ui).await {
            Ok(artifact) => {
                info!(plugin = self.plugin.key(), path = %artifact.path, "build finished");
                Ok(artifact)
            }
            Err(e) => {
                warn!(plugin = self.plugin.key(), error = %e, "build failed");
                Err(BuilderError::Build(format!("{e:#}")))
            }
        }
    }

    /// Configure, then build
    pub async fn run(
        &mut self,
        stanza: &BuildStanza,
        ctx: &BuildContext,
        ui: &dyn TerminalUi,
    ) -> BuilderResult<Artifact> {
        self.configure(stanza)?;
        self.build(ctx, ui).await
    }
}
