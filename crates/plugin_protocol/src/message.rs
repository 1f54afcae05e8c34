//! Serializable message types for plugin communication.
//!
//! When a plugin runs out of process it cannot call the host's [`TerminalUi`] directly.
//! Instead every status operation is written as one JSON line ([`UiEvent`]) that a host can
//! render with its own UI.

use std::io::Write;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::traits::{Status, TerminalUi};
use crate::types::{Artifact, StepStyle};

/// One status operation, as it travels over the wire.
///
/// ```rust
/// # use builder_plugin_protocol::{StepStyle, UiEvent};
/// let event = UiEvent::Step { style: StepStyle::Ok, message: "[info] done".to_string() };
/// let json = serde_json::to_string(&event).unwrap();
/// assert_eq!(json, r#"{"event":"step","style":"ok","message":"[info] done"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum UiEvent {
    Update { message: String },
    Step { style: StepStyle, message: String },
    Close,
}

/// Final line of a plugin's build stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildMessage {
    pub artifact: Artifact,
}

/// A [`TerminalUi`] that serializes status operations as JSON lines.
///
/// Write errors are ignored: losing progress output must not fail the build.
pub struct JsonLinesUi<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesUi<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Write any serializable value as a single line.
    pub fn emit<T: Serialize>(&self, value: &T) {
        let Ok(line) = serde_json::to_string(value) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{line}");
            let _ = writer.flush();
        }
    }
}

impl<W: Write + Send> TerminalUi for JsonLinesUi<W> {
    fn status(&self) -> Box<dyn Status + '_> {
        Box::new(JsonLinesStatus {
            ui: self,
            closed: false,
        })
    }
}

struct JsonLinesStatus<'a, W: Write + Send> {
    ui: &'a JsonLinesUi<W>,
    closed: bool,
}

impl<W: Write + Send> Status for JsonLinesStatus<'_, W> {
    fn update(&mut self, message: &str) {
        self.ui.emit(&UiEvent::Update {
            message: message.to_string(),
        });
    }

    fn step(&mut self, style: StepStyle, message: &str) {
        self.ui.emit(&UiEvent::Step {
            style,
            message: message.to_string(),
        });
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.ui.emit(&UiEvent::Close);
        }
    }
}
