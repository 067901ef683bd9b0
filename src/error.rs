//! Error types for request decoding and the `redis-request` binary.

use std::io;
use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("file error: {0}")]
    FileError(#[from] io::Error),

    #[error("parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Telemetry initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("metrics initialization failed: {0}")]
    MetricsInit(String),
}

/// Failure to decode one request from a byte source.
///
/// `Io` means the source itself failed or ended mid-line (the connection died);
/// `Protocol` means the client sent bytes that do not form a request.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl DecodeError {
    pub fn is_protocol(&self) -> bool {
        matches!(self, DecodeError::Protocol(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, DecodeError::Io(_))
    }

    /// The protocol violation, if this is not a transport error.
    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            DecodeError::Protocol(e) => Some(e),
            DecodeError::Io(_) => None,
        }
    }
}

/// Wire-format violations. Lines are kept lossily decoded for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("malformed request: '{line}' does not match *<numberOfArguments>\\r\\n")]
    MalformedFraming { line: String },

    #[error("malformed request: '{line}' does not match $<argumentLength>\\r\\n")]
    MalformedArgumentLength { line: String },

    #[error("malformed request: source ended after {got} of {declared} argument bytes")]
    TruncatedArgument { declared: usize, got: usize },

    #[error("malformed request: argument length {got} does not match declared {declared}")]
    ArgumentLengthMismatch { declared: usize, got: usize },

    #[error("malformed request: argument should end with \\r\\n")]
    MissingTrailingCRLF,

    #[error("malformed request: line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("malformed request: {declared} arguments exceeds limit of {limit}")]
    TooManyArguments { declared: usize, limit: usize },

    #[error("malformed request: argument of {declared} bytes exceeds limit of {limit}")]
    ArgumentTooLarge { declared: usize, limit: usize },
}

impl ProtocolError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProtocolError::MalformedFraming { .. } => "malformed_framing",
            ProtocolError::MalformedArgumentLength { .. } => "malformed_argument_length",
            ProtocolError::TruncatedArgument { .. } => "truncated_argument",
            ProtocolError::ArgumentLengthMismatch { .. } => "argument_length_mismatch",
            ProtocolError::MissingTrailingCRLF => "missing_trailing_crlf",
            ProtocolError::LineTooLong { .. } => "line_too_long",
            ProtocolError::TooManyArguments { .. } => "too_many_arguments",
            ProtocolError::ArgumentTooLarge { .. } => "argument_too_large",
        }
    }

    pub(crate) fn malformed_framing(line: &[u8]) -> Self {
        ProtocolError::MalformedFraming {
            line: render_line(line),
        }
    }

    pub(crate) fn malformed_argument_length(line: &[u8]) -> Self {
        ProtocolError::MalformedArgumentLength {
            line: render_line(line),
        }
    }
}

/// Strip the line terminator and decode lossily so the message stays printable.
fn render_line(line: &[u8]) -> String {
    let end = line
        .iter()
        .rposition(|b| *b != b'\r' && *b != b'\n')
        .map_or(0, |pos| pos + 1);
    String::from_utf8_lossy(&line[..end]).into_owned()
}

pub type Result<T> = std::result::Result<T, AppError>;
