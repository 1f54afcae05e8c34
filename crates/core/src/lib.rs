//! sbt-builder host library
//!
//! The host side of the builder plugin protocol. It loads the app configuration file, drives a
//! plugin through its lifecycle, and renders the plugin's status output in the terminal.
//!
//! ## Architecture
//!
//! - [`configs`] - App configuration file (`builder.yml`)
//! - [`lifecycle`] - Config → ConfigSet → Build sequencing for a plugin
//! - [`ui`] - Colored terminal implementation of the plugin UI sink
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use builder_core::configs::parse_app_config;
//! use builder_core::lifecycle::BuildSession;
//! use builder_core::ui::ConsoleUi;
//! use builder_plugin_protocol::{BuildContext, BuilderPlugin};
//!
//! # async fn example<P: BuilderPlugin>(plugin: P) -> builder_core::types::BuilderResult<()> {
//! let config = parse_app_config("build:\n  use: sbt\n")?;
//! let mut session = BuildSession::new(plugin);
//! let artifact = session
//!     .run(&config.build, &BuildContext::detached(), &ConsoleUi::stdout())
//!     .await?;
//! println!("{}", artifact.path);
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod lifecycle;
pub mod types;
pub mod ui;

// Re-export the main types for easier usage
pub use lifecycle::BuildSession;
pub use types::{BuilderError, BuilderResult};
pub use ui::ConsoleUi;
