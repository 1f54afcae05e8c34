//! Protocol definitions shared by build hosts and builder plugins.
//!
//! A host loads a plugin, asks it to describe and validate its configuration, and then runs
//! its build, supplying a UI sink and a cancellation signal. See [`BuilderPlugin`] for the
//! lifecycle.

pub mod context;
pub mod message;
pub mod traits;
pub mod types;

pub use context::{BuildContext, CancelHandle};
pub use message::{BuildMessage, JsonLinesUi, UiEvent};
pub use traits::{BuilderPlugin, Status, TerminalUi};
pub use types::{Artifact, PluginKey, StepStyle};
