//! Colored terminal implementation of the plugin UI sink.

use std::io::{self, Write};
use std::sync::Mutex;

use builder_plugin_protocol::{Status, StepStyle, TerminalUi};
use colored::*;

/// Renders plugin status output as colored lines.
///
/// - headline updates: `» message`
/// - successful steps: `✓ message`
/// - failed steps: `✗ message`
pub struct ConsoleUi<W: Write + Send = io::Stdout> {
    writer: Mutex<W>,
}

impl ConsoleUi {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleUi<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Take back the writer, e.g. to inspect what was rendered.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line(&self, line: &str) {
        // A broken terminal must not fail the build
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{line}");
            let _ = writer.flush();
        }
    }
}

impl<W: Write + Send> TerminalUi for ConsoleUi<W> {
    fn status(&self) -> Box<dyn Status + '_> {
        Box::new(ConsoleStatus {
            ui: self,
            closed: false,
        })
    }
}

struct ConsoleStatus<'a, W: Write + Send> {
    ui: &'a ConsoleUi<W>,
    closed: bool,
}

impl<W: Write + Send> Status for ConsoleStatus<'_, W> {
    fn update(&mut self, message: &str) {
        if self.closed {
            return;
        }
        self.ui
            .write_line(&format!("{} {}", "»".cyan().bold(), message.bold()));
    }

    fn step(&mut self, style: StepStyle, message: &str) {
        if self.closed {
            return;
        }
        let line = match style {
            StepStyle::Ok => format!("{} {}", "✓".green().bold(), message),
            StepStyle::Error => format!("{} {}", "✗".red().bold(), message.red()),
        };
        self.ui.write_line(&line);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Pick a stable label color for an application name.
pub fn app_color(app_name: &str) -> Color {
    let hash = app_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Label colors only; red and green are reserved for step outcomes
    let colors = [
        Color::TrueColor {
            r: 147,
            g: 112,
            b: 219,
        },
        Color::TrueColor {
            r: 64,
            g: 224,
            b: 208,
        },
        Color::TrueColor {
            r: 255,
            g: 140,
            b: 0,
        },
        Color::TrueColor {
            r: 100,
            g: 149,
            b: 237,
        },
    ];

    colors[(hash % colors.len() as u64) as usize]
}
