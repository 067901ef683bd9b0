//! Inline command parser.
//!
//! Fallback for clients that send a bare line like "SET key value\r\n" instead
//! of a multibulk frame. Tokens are split on single spaces with no quoting or
//! unescaping, so consecutive spaces produce empty arguments.

use bytes::Bytes;

use super::{ProtocolFormat, Request};

/// Parser for inline (telnet-style) commands.
pub struct InlineParser;

impl InlineParser {
    /// Parse one inline line, terminator included. Any line is a request.
    pub fn parse(line: &[u8]) -> Request {
        let mut tokens = trim_terminator(line).split(|b| *b == b' ');
        let name = tokens.next().unwrap_or(&[]);
        let args = tokens.map(Bytes::copy_from_slice).collect();

        Request::from_parts(name, args, ProtocolFormat::Inline)
    }
}

/// Strip any trailing run of `\r` and `\n`.
fn trim_terminator(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| *b != b'\r' && *b != b'\n')
        .map_or(0, |pos| pos + 1);
    &line[..end]
}
