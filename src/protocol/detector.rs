//! Request format detection from the first line of a request.

use super::multibulk::parse_count;

/// Wire form of a decoded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolFormat {
    /// `*<N>\r\n` followed by `N` bulk arguments
    Multibulk,
    /// Space-separated tokens on one line
    Inline,
}

impl ProtocolFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolFormat::Multibulk => "multibulk",
            ProtocolFormat::Inline => "inline",
        }
    }
}

/// Outcome of inspecting the first line of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstLine {
    /// A valid `*<N>\r\n` header with its declared count
    Multibulk(usize),
    /// Anything else, to be decoded as an inline command
    Inline,
}

/// Classify the first line of a request, terminator included.
///
/// Only `*` followed by decimal digits and `\r\n` is a frame header; a sign,
/// a missing `\r` or trailing bytes send the line down the inline path.
pub fn detect_format(line: &[u8]) -> FirstLine {
    match parse_count(line, b'*') {
        Some(count) => FirstLine::Multibulk(count),
        None => FirstLine::Inline,
    }
}
