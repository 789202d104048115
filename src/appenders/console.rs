//! Console sink implementation

use crate::core::output_format::{render_line, RenderOptions};
use crate::core::{LoggerError, Result, Sink, WriteUnit};
use std::io::Write;

/// Which standard stream a console sink writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    fn label(self) -> &'static str {
        match self {
            ConsoleTarget::Stdout => "stdout",
            ConsoleTarget::Stderr => "stderr",
        }
    }
}

/// Writes JSON lines to stdout or stderr
///
/// Raw records are encoded on write. With [`ConsoleSink::with_render`]
/// every line is rendered for humans before it is written.
pub struct ConsoleSink {
    target: ConsoleTarget,
    render: Option<RenderOptions>,
}

impl ConsoleSink {
    pub fn new(target: ConsoleTarget) -> Self {
        Self {
            target,
            render: None,
        }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleTarget::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleTarget::Stderr)
    }

    /// Render lines with the given output mode instead of writing raw JSON
    ///
    /// # Example
    ///
    /// ```
    /// use rust_bunyan::appenders::ConsoleSink;
    /// use rust_bunyan::{OutputMode, RenderOptions};
    ///
    /// let sink = ConsoleSink::stdout()
    ///     .with_render(RenderOptions::new(OutputMode::Short).with_color(false));
    /// ```
    #[must_use]
    pub fn with_render(mut self, options: RenderOptions) -> Self {
        self.render = Some(options);
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn write_bytes(&self, bytes: &[u8]) -> std::io::Result<()> {
        match self.target {
            ConsoleTarget::Stdout => std::io::stdout().lock().write_all(bytes),
            ConsoleTarget::Stderr => std::io::stderr().lock().write_all(bytes),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Sink for ConsoleSink {
    fn write(&self, unit: &WriteUnit) -> Result<()> {
        let line = unit.to_text()?;
        let result = match &self.render {
            Some(options) => {
                let mut rendered = render_line(line.trim_end_matches('\n'), options);
                rendered.push('\n');
                self.write_bytes(rendered.as_bytes())
            }
            None => self.write_bytes(line.as_bytes()),
        };
        result.map_err(|e| {
            LoggerError::io_operation(format!("writing to {}", self.target.label()), "console", e)
        })
    }

    fn flush(&self) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => std::io::stdout().flush()?,
            ConsoleTarget::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn on_error(&self, error: &LoggerError) {
        eprintln!("[LOGGER ERROR] {} sink: {}", self.target.label(), error);
    }

    fn name(&self) -> &str {
        self.target.label()
    }
}
