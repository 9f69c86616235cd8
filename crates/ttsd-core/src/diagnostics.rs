//! Diagnostic channel: the structurally significant lines on stderr.
//!
//! Hosts only parse two kinds of line: `READY` (once, after warm-up) and
//! `ERROR: <message>`. Everything else on stderr is free-form logging and is
//! ignored. Protocol lines go through a [`DiagnosticSink`] rather than the
//! tracing subscriber so their shape never depends on log formatting.
//!
//! # Implementations
//!
//! - [`StderrDiagnostics`] - the real channel
//! - [`MemoryDiagnostics`] - records lines, for tests

use std::io::Write;
use std::sync::Mutex;

/// Line emitted once the sidecar accepts commands.
pub const READY_LINE: &str = "READY";

/// Prefix of every error line.
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Sink for protocol-significant diagnostic lines.
///
/// Implementations must not block for long: `error` is called from the
/// command reader task.
pub trait DiagnosticSink: Send + Sync {
    /// Emit the `READY` line.
    fn ready(&self);

    /// Emit an `ERROR: <message>` line.
    fn error(&self, message: &str);
}

/// Writes diagnostic lines to the process's stderr, flushing each one.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrDiagnostics;

impl StderrDiagnostics {
    pub const fn new() -> Self {
        Self
    }

    fn write_line(line: &str) {
        let mut stderr = std::io::stderr().lock();
        // Nothing sensible to do if stderr is gone
        let _ = writeln!(stderr, "{line}");
        let _ = stderr.flush();
    }
}

impl DiagnosticSink for StderrDiagnostics {
    fn ready(&self) {
        Self::write_line(READY_LINE);
    }

    fn error(&self, message: &str) {
        Self::write_line(&format_error_line(message));
    }
}

/// Records diagnostic lines in memory.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    lines: Mutex<Vec<String>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines recorded so far, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Only the `ERROR:` lines.
    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.starts_with(ERROR_PREFIX))
            .collect()
    }

    /// How many `READY` lines were emitted.
    pub fn ready_count(&self) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.as_str() == READY_LINE)
            .count()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl DiagnosticSink for MemoryDiagnostics {
    fn ready(&self) {
        self.push(READY_LINE.to_string());
    }

    fn error(&self, message: &str) {
        self.push(format_error_line(message));
    }
}

/// Format a message as a single `ERROR:` line.
///
/// Embedded newlines are flattened so one error never spans several lines.
#[must_use]
pub fn format_error_line(message: &str) -> String {
    let flat: String = message
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!("{ERROR_PREFIX}{flat}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_lines_are_prefixed() {
        assert_eq!(format_error_line("boom"), "ERROR: boom");
    }

    #[test]
    fn error_lines_never_span_lines() {
        assert_eq!(format_error_line("a\nb\r\nc"), "ERROR: a b  c");
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryDiagnostics::new();

        sink.error("first");
        sink.ready();
        sink.error("second");

        assert_eq!(sink.lines(), vec!["ERROR: first", "READY", "ERROR: second"]);
        assert_eq!(sink.errors().len(), 2);
        assert_eq!(sink.ready_count(), 1);
    }
}
