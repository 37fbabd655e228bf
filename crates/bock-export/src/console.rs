//! Human-readable progress output.

use std::fmt;

use console::{Term, style};

/// Sink for user-facing progress text.
///
/// Messages are written as given, including any trailing newline.
pub trait ConsoleLogger: Send + Sync {
    /// Emit a warning.
    fn warn(&self, args: fmt::Arguments<'_>);

    /// Emit an informational message.
    fn print(&self, args: fmt::Arguments<'_>);
}

/// Console that writes informational messages to standard output and
/// warnings to standard error.
#[derive(Debug, Clone)]
pub struct TerminalConsole {
    out: Term,
    err: Term,
}

impl TerminalConsole {
    /// Messages on standard output, warnings on standard error.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
        }
    }

    /// Everything on standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            out: Term::stderr(),
            err: Term::stderr(),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger for TerminalConsole {
    fn warn(&self, args: fmt::Arguments<'_>) {
        let message = args.to_string();
        tracing::debug!(message = %message.trim_end(), "console warning");
        if let Err(err) = self.err.write_str(&style(message).yellow().to_string()) {
            tracing::warn!(error = %err, "Failed to write to console");
        }
    }

    fn print(&self, args: fmt::Arguments<'_>) {
        let message = args.to_string();
        tracing::debug!(message = %message.trim_end(), "console output");
        if let Err(err) = self.out.write_str(&message) {
            tracing::warn!(error = %err, "Failed to write to console");
        }
    }
}
