//! Command reader: ingests stdin on its own task.
//!
//! The reader is the only consumer of the input stream. It never waits on the
//! controller: an `interrupt` flips the [`InterruptFlag`] immediately, every
//! other command goes onto an unbounded queue, and malformed lines are
//! reported and dropped. Because the controller never reads input itself, an
//! interrupt is observed even while a generation is streaming.
//!
//! Lines are read as raw bytes so a line with invalid UTF-8 is rejected on
//! its own instead of ending the reader.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use ttsd_core::{Command, DiagnosticSink, parse_line};

use crate::interrupt::InterruptFlag;

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line, ignored.
    Blank,
    /// Interrupt flag set.
    Interrupted,
    /// Command pushed onto the queue.
    Queued,
    /// Line could not be parsed; an `ERROR:` line was emitted.
    Rejected,
    /// The controller dropped the queue; the reader should stop.
    QueueClosed,
}

/// Routes parsed commands to the interrupt flag or the command queue.
pub struct CommandRouter {
    interrupt: InterruptFlag,
    commands: mpsc::UnboundedSender<Command>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl CommandRouter {
    pub fn new(
        interrupt: InterruptFlag,
        commands: mpsc::UnboundedSender<Command>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            interrupt,
            commands,
            diagnostics,
        }
    }

    /// Handle one raw input line (without its trailing newline).
    pub fn route_bytes(&self, line: &[u8]) -> LineOutcome {
        match std::str::from_utf8(line) {
            Ok(text) => self.route(text),
            Err(e) => {
                self.diagnostics
                    .error(&format!("Invalid command: input is not valid UTF-8 ({e})"));
                LineOutcome::Rejected
            }
        }
    }

    /// Handle one input line.
    pub fn route(&self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Blank;
        }

        match parse_line(line) {
            Ok(Command::Interrupt) => {
                self.interrupt.set();
                LineOutcome::Interrupted
            }
            Ok(command) => {
                debug!(cmd = command.tag(), "Command queued");
                if self.commands.send(command).is_err() {
                    LineOutcome::QueueClosed
                } else {
                    LineOutcome::Queued
                }
            }
            Err(e) => {
                self.diagnostics.error(&format!("Invalid command: {e}"));
                LineOutcome::Rejected
            }
        }
    }
}

/// Spawn the reader task over `input`.
///
/// The task ends at end-of-stream, on a read error (logged and treated as
/// end-of-stream), or when the queue's receiver is dropped. Ending drops the
/// queue sender, which lets the controller see the input is closed.
pub fn spawn_command_reader<R>(input: R, router: CommandRouter) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(input);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    info!("Command input closed");
                    break;
                }
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                    }
                    if router.route_bytes(&buf) == LineOutcome::QueueClosed {
                        debug!("Command queue closed; reader stopping");
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Command input read failed; treating as end of input");
                    break;
                }
            }
        }

        debug!("Command reader task exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttsd_core::MemoryDiagnostics;

    fn router() -> (
        CommandRouter,
        InterruptFlag,
        mpsc::UnboundedReceiver<Command>,
        Arc<MemoryDiagnostics>,
    ) {
        let flag = InterruptFlag::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let router = CommandRouter::new(flag.clone(), tx, diagnostics.clone());
        (router, flag, rx, diagnostics)
    }

    #[test]
    fn blank_lines_are_ignored() {
        let (router, flag, mut rx, diagnostics) = router();

        assert_eq!(router.route(""), LineOutcome::Blank);
        assert_eq!(router.route("   \t\r"), LineOutcome::Blank);

        assert!(rx.try_recv().is_err());
        assert!(!flag.is_set());
        assert!(diagnostics.lines().is_empty());
    }

    #[test]
    fn interrupt_sets_flag_and_bypasses_queue() {
        let (router, flag, mut rx, _diagnostics) = router();

        router.route(r#"{"cmd":"generate","text":"a"}"#);
        assert_eq!(router.route(r#"{"cmd":"interrupt"}"#), LineOutcome::Interrupted);

        assert!(flag.is_set());
        assert_eq!(
            rx.try_recv().unwrap(),
            Command::Generate {
                text: "a".to_string()
            }
        );
        assert!(rx.try_recv().is_err(), "interrupt must never be queued");
    }

    #[test]
    fn commands_keep_arrival_order() {
        let (router, _flag, mut rx, _diagnostics) = router();

        router.route(r#"{"cmd":"generate","text":"A"}"#);
        router.route(r#"{"cmd":"bogus"}"#);
        router.route(r#"{"cmd":"generate","text":"B"}"#);
        router.route(r#"{"cmd":"quit"}"#);

        let tags: Vec<&str> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|c| c.tag())
            .collect();
        assert_eq!(tags, vec!["generate", "unknown", "generate", "quit"]);
    }

    #[test]
    fn malformed_lines_report_and_continue() {
        let (router, _flag, mut rx, diagnostics) = router();

        assert_eq!(router.route("garbage"), LineOutcome::Rejected);
        assert_eq!(router.route(r#"{"cmd":"quit"}"#), LineOutcome::Queued);

        assert_eq!(rx.try_recv().unwrap(), Command::Quit);
        let errors = diagnostics.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("ERROR: Invalid command:"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let (router, _flag, mut rx, diagnostics) = router();

        assert_eq!(router.route_bytes(b"{\"cmd\":\"gen\xffrate\"}"), LineOutcome::Rejected);

        assert!(rx.try_recv().is_err());
        assert_eq!(diagnostics.errors().len(), 1);
    }

    #[test]
    fn interrupt_with_non_string_text_still_sets_flag() {
        let (router, flag, mut rx, diagnostics) = router();

        assert_eq!(router.route(r#"{"cmd":"interrupt","text":5}"#), LineOutcome::Interrupted);

        assert!(flag.is_set());
        assert!(rx.try_recv().is_err());
        assert!(diagnostics.errors().is_empty());
    }

    #[test]
    fn quit_with_non_string_text_is_queued() {
        let (router, _flag, mut rx, diagnostics) = router();

        assert_eq!(router.route(r#"{"cmd":"quit","text":{"x":1}}"#), LineOutcome::Queued);

        assert_eq!(rx.try_recv().unwrap(), Command::Quit);
        assert!(diagnostics.errors().is_empty());
    }

    #[test]
    fn closed_queue_is_reported() {
        let (router, _flag, rx, _diagnostics) = router();
        drop(rx);

        assert_eq!(router.route(r#"{"cmd":"quit"}"#), LineOutcome::QueueClosed);
    }

    #[tokio::test]
    async fn reader_task_routes_until_end_of_input() {
        let (router, flag, mut rx, diagnostics) = router();
        let input: &'static [u8] =
            b"{\"cmd\":\"generate\",\"text\":\"hi\"}\n\nnot json\n{\"cmd\":\"interrupt\"}\r\n{\"cmd\":\"quit\"}";

        spawn_command_reader(input, router).await.unwrap();

        assert!(flag.is_set());
        assert_eq!(
            rx.recv().await,
            Some(Command::Generate {
                text: "hi".to_string()
            })
        );
        assert_eq!(rx.recv().await, Some(Command::Quit));
        assert_eq!(rx.recv().await, None, "queue closes when input ends");
        assert_eq!(diagnostics.errors().len(), 1);
    }

    #[tokio::test]
    async fn read_error_ends_input_after_queued_lines() {
        let (router, _flag, mut rx, diagnostics) = router();
        let input = tokio_test::io::Builder::new()
            .read(b"{\"cmd\":\"generate\",\"text\":\"par")
            .read(b"tial\"}\n")
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            .build();

        spawn_command_reader(input, router).await.unwrap();

        assert_eq!(
            rx.recv().await,
            Some(Command::Generate {
                text: "partial".to_string()
            })
        );
        assert_eq!(rx.recv().await, None);
        assert!(diagnostics.errors().is_empty());
    }
}
