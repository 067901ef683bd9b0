//! Line-level rules of the multibulk framing.
//!
//! Everything here works on bytes that were already read, so the blocking
//! and async decoders share one definition of what a valid frame looks like.

use std::io;
use tracing::debug;

use crate::config::DecoderConfig;
use crate::error::{DecodeError, ProtocolError};

/// Terminator that must follow every argument payload.
pub const CRLF: [u8; 2] = [b'\r', b'\n'];

/// Upper bound on up-front allocation, whatever a header declares.
pub(crate) const MAX_PREALLOC: usize = 64 * 1024;

/// Parse `<sigil><digits>\r\n` into its count.
///
/// Digits only: a sign, an empty count, a missing `\r` or trailing bytes are
/// all rejected, which is what keeps negative lengths out of the decoder.
pub fn parse_count(line: &[u8], sigil: u8) -> Option<usize> {
    let digits = line.strip_prefix(&[sigil])?.strip_suffix(&CRLF)?;
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Apply count policy to a parsed `*<N>` header.
///
/// A zero count carries no command name and is rejected as malformed framing.
pub fn check_frame_count(
    line: &[u8],
    count: usize,
    config: &DecoderConfig,
) -> Result<usize, ProtocolError> {
    if count == 0 {
        return Err(rejected(ProtocolError::malformed_framing(line)));
    }
    if count > config.max_args {
        return Err(rejected(ProtocolError::TooManyArguments {
            declared: count,
            limit: config.max_args,
        }));
    }
    Ok(count)
}

/// Parse a `$<M>\r\n` argument header into its byte count.
pub fn parse_argument_header(line: &[u8], config: &DecoderConfig) -> Result<usize, ProtocolError> {
    let declared = parse_count(line, b'$')
        .ok_or_else(|| rejected(ProtocolError::malformed_argument_length(line)))?;
    if declared > config.max_bulk_len {
        return Err(rejected(ProtocolError::ArgumentTooLarge {
            declared,
            limit: config.max_bulk_len,
        }));
    }
    Ok(declared)
}

/// Compare a payload read against its declared length.
///
/// `at_end` tells whether the source was exhausted after the short read. A
/// short payload at end of source is truncated; otherwise the source handed
/// back fewer bytes than declared and the lengths mismatch.
pub fn check_payload(declared: usize, got: usize, at_end: bool) -> Result<(), ProtocolError> {
    if got == declared {
        return Ok(());
    }
    let err = if at_end {
        ProtocolError::TruncatedArgument { declared, got }
    } else {
        ProtocolError::ArgumentLengthMismatch { declared, got }
    };
    Err(rejected(err))
}

/// Validate one byte of the trailing `\r\n`.
///
/// End of source counts as a missing terminator; other I/O failures pass
/// through as transport errors.
pub fn check_terminator(expected: u8, read: io::Result<u8>) -> Result<(), DecodeError> {
    match read {
        Ok(byte) if byte == expected => Ok(()),
        Ok(_) => Err(rejected(ProtocolError::MissingTrailingCRLF).into()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(rejected(ProtocolError::MissingTrailingCRLF).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Validate a line produced by a `read_until(b'\n')` capped at `limit` bytes.
pub fn check_line(line: &[u8], limit: usize) -> Result<(), DecodeError> {
    if line.last() == Some(&b'\n') {
        return Ok(());
    }
    if line.len() >= limit {
        return Err(rejected(ProtocolError::LineTooLong { limit }).into());
    }
    let message = if line.is_empty() {
        "source closed before a request"
    } else {
        "source closed mid-line"
    };
    Err(io::Error::new(io::ErrorKind::UnexpectedEof, message).into())
}

fn rejected(err: ProtocolError) -> ProtocolError {
    debug!("Rejecting request: {}", err);
    err
}

/// Initial capacity for a buffer that will eventually hold `declared` items.
pub(crate) fn prealloc(declared: usize) -> usize {
    declared.min(MAX_PREALLOC)
}
