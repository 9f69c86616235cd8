//! Command protocol parsing.
//!
//! The host writes one JSON object per line to the sidecar's stdin. Each line
//! maps to exactly one [`Command`] variant, or fails with a [`ProtocolError`].
//!
//! # Protocol Schema
//!
//! ```json
//! {"cmd": "generate", "text": "Hello world"}
//! {"cmd": "interrupt"}
//! {"cmd": "quit"}
//! ```
//!
//! A `generate` without `text` synthesizes nothing (the empty string). Any
//! `cmd` other than the three above, including a missing or non-string `cmd`,
//! parses to [`Command::Unknown`] so the controller can report it without the
//! reader treating it as malformed input.

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when parsing a command line.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Invalid field: {0}")]
    InvalidField(serde_json::Error),
}

// ============================================================================
// Commands
// ============================================================================

/// A command received from the host process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synthesize `text` and stream it back as audio frames.
    Generate {
        /// Text to speak. May be empty, in which case only the end marker is written.
        text: String,
    },

    /// Stop the generation that is currently running.
    Interrupt,

    /// Finish and exit.
    Quit,

    /// A well-formed object whose `cmd` is not recognised.
    Unknown {
        /// The trimmed input line, kept for the diagnostic message.
        raw: String,
    },
}

impl Command {
    /// Short tag used in log fields.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Generate { .. } => "generate",
            Self::Interrupt => "interrupt",
            Self::Quit => "quit",
            Self::Unknown { .. } => "unknown",
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Raw JSON envelope for parsing.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    cmd: Option<serde_json::Value>,
    /// Only `generate` reads it, so other commands ignore its type.
    #[serde(default)]
    text: Option<serde_json::Value>,
}

/// Parse a single line of protocol input into a [`Command`].
///
/// Surrounding whitespace is ignored. Callers are expected to skip blank
/// lines before calling this; a blank line is reported as invalid JSON.
///
/// # Examples
///
/// ```
/// use ttsd_core::{Command, parse_line};
///
/// let cmd = parse_line(r#"{"cmd": "generate", "text": "Hi"}"#).unwrap();
/// assert_eq!(cmd, Command::Generate { text: "Hi".to_string() });
/// ```
pub fn parse_line(line: &str) -> Result<Command, ProtocolError> {
    let line = line.trim();
    let value: serde_json::Value = serde_json::from_str(line)?;

    if !value.is_object() {
        return Err(ProtocolError::NotAnObject(json_kind(&value)));
    }

    let envelope = RawEnvelope::deserialize(value).map_err(ProtocolError::InvalidField)?;

    let command = match envelope.cmd.as_ref().and_then(serde_json::Value::as_str) {
        Some("generate") => Command::Generate {
            text: generate_text(envelope.text)?,
        },
        Some("interrupt") => Command::Interrupt,
        Some("quit") => Command::Quit,
        _ => Command::Unknown {
            raw: line.to_string(),
        },
    };

    Ok(command)
}

/// A missing or null `text` is the empty string; anything else must be a string.
fn generate_text(text: Option<serde_json::Value>) -> Result<String, ProtocolError> {
    let Some(value) = text else {
        return Ok(String::new());
    };
    let text = Option::<String>::deserialize(value).map_err(ProtocolError::InvalidField)?;
    Ok(text.unwrap_or_default())
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Known commands
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_generate() {
        let cmd = parse_line(r#"{"cmd": "generate", "text": "Hello world"}"#).unwrap();

        assert_eq!(
            cmd,
            Command::Generate {
                text: "Hello world".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_generate_without_text_is_empty() {
        let cmd = parse_line(r#"{"cmd": "generate"}"#).unwrap();

        assert_eq!(cmd, Command::Generate { text: String::new() });
    }

    #[test]
    fn test_parse_generate_null_text_is_empty() {
        let cmd = parse_line(r#"{"cmd": "generate", "text": null}"#).unwrap();

        assert_eq!(cmd, Command::Generate { text: String::new() });
    }

    #[test]
    fn test_parse_interrupt_and_quit() {
        assert_eq!(parse_line(r#"{"cmd":"interrupt"}"#).unwrap(), Command::Interrupt);
        assert_eq!(parse_line(r#"{"cmd":"quit"}"#).unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_ignores_extra_fields_and_whitespace() {
        let cmd = parse_line("  {\"cmd\": \"interrupt\", \"id\": 7}\r\n").unwrap();

        assert_eq!(cmd, Command::Interrupt);
    }

    // ------------------------------------------------------------------------
    // Unknown commands
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_unknown_cmd_keeps_raw_line() {
        let line = r#"{"cmd": "pause"}"#;
        let cmd = parse_line(line).unwrap();

        assert_eq!(
            cmd,
            Command::Unknown {
                raw: line.to_string(),
            }
        );
    }

    #[test]
    fn test_parse_missing_cmd_is_unknown() {
        let cmd = parse_line(r#"{"text": "orphan"}"#).unwrap();

        assert!(matches!(cmd, Command::Unknown { .. }));
    }

    #[test]
    fn test_parse_non_string_cmd_is_unknown() {
        let cmd = parse_line(r#"{"cmd": 3}"#).unwrap();

        assert!(matches!(cmd, Command::Unknown { .. }));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let cmd = parse_line(r#"{"cmd": "QUIT"}"#).unwrap();

        assert!(matches!(cmd, Command::Unknown { .. }));
    }

    // ------------------------------------------------------------------------
    // Error cases
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_line("not json at all").unwrap_err();

        assert!(matches!(err, ProtocolError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_truncated_object() {
        let err = parse_line(r#"{"cmd": "generate", "text": "Hel"#).unwrap_err();

        assert!(matches!(err, ProtocolError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_non_object_values() {
        for line in ["42", "\"generate\"", "[\"generate\", \"hi\"]", "null", "true"] {
            let err = parse_line(line).unwrap_err();
            assert!(
                matches!(err, ProtocolError::NotAnObject(_)),
                "expected NotAnObject for {line}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_non_string_text() {
        let err = parse_line(r#"{"cmd": "generate", "text": 5}"#).unwrap_err();

        assert!(matches!(err, ProtocolError::InvalidField(_)));
    }

    #[test]
    fn test_parse_interrupt_ignores_non_string_text() {
        let cmd = parse_line(r#"{"cmd": "interrupt", "text": 5}"#).unwrap();

        assert_eq!(cmd, Command::Interrupt);
    }

    #[test]
    fn test_parse_quit_ignores_non_string_text() {
        let cmd = parse_line(r#"{"cmd": "quit", "text": {"x": 1}}"#).unwrap();

        assert_eq!(cmd, Command::Quit);
    }

    #[test]
    fn test_parse_unknown_cmd_ignores_non_string_text() {
        let cmd = parse_line(r#"{"cmd": "pause", "text": [1, 2]}"#).unwrap();

        assert!(matches!(cmd, Command::Unknown { .. }));
    }

    #[test]
    fn test_protocol_error_display() {
        let err = parse_line("[]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_command_tags() {
        assert_eq!(Command::Quit.tag(), "quit");
        assert_eq!(Command::Generate { text: String::new() }.tag(), "generate");
    }
}
