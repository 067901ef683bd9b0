use bytes::Bytes;
use std::io::{BufRead, Read};
use tracing::trace;

use super::detector::{detect_format, FirstLine};
use super::multibulk::{self, CRLF};
use super::{InlineParser, ProtocolFormat, Request};
use crate::config::DecoderConfig;
use crate::error::DecodeError;

/// Decodes one request per call from a buffered byte source.
///
/// Holds only its limits; all parsing state lives in a single call, so one
/// decoder can serve any number of sources. Reads stop at the end of the
/// current request and the decoder never writes to the source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestDecoder {
    config: DecoderConfig,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode the request starting at the source's current position.
    ///
    /// A `*<N>\r\n` header is decoded as a multibulk frame; any other first
    /// line is decoded as an inline command.
    pub fn decode<R: BufRead>(&self, source: &mut R) -> Result<Request, DecodeError> {
        let line = self.read_line(source)?;
        trace!("First line: {:?}", String::from_utf8_lossy(&line));

        match detect_format(&line) {
            FirstLine::Multibulk(count) => {
                let count = multibulk::check_frame_count(&line, count, &self.config)?;
                let name = self.read_argument(source)?;

                let mut args = Vec::with_capacity(multibulk::prealloc(count - 1));
                for _ in 1..count {
                    args.push(self.read_argument(source)?);
                }

                Ok(Request::from_parts(&name, args, ProtocolFormat::Multibulk))
            }
            FirstLine::Inline => Ok(InlineParser::parse(&line)),
        }
    }

    /// Like [`decode`](Self::decode), but `Ok(None)` when the source is
    /// exhausted exactly at a request boundary.
    pub fn next_request<R: BufRead>(&self, source: &mut R) -> Result<Option<Request>, DecodeError> {
        if source.fill_buf()?.is_empty() {
            return Ok(None);
        }
        self.decode(source).map(Some)
    }

    /// Iterate over every request in `source`.
    ///
    /// Iteration ends at a clean end of source or after a transport error.
    /// Protocol errors are yielded and decoding resumes after the bytes they
    /// consumed.
    pub fn requests<R: BufRead>(&self, source: R) -> Requests<'_, R> {
        Requests {
            decoder: self,
            source,
            done: false,
        }
    }

    fn read_line<R: BufRead>(&self, source: &mut R) -> Result<Vec<u8>, DecodeError> {
        let limit = self.config.max_line_len;
        let mut line = Vec::new();
        source.by_ref().take(limit as u64).read_until(b'\n', &mut line)?;
        multibulk::check_line(&line, limit)?;
        Ok(line)
    }

    /// Read one `$<M>\r\n<payload>\r\n` argument.
    fn read_argument<R: BufRead>(&self, source: &mut R) -> Result<Bytes, DecodeError> {
        let line = self.read_line(source)?;
        let declared = multibulk::parse_argument_header(&line, &self.config)?;
        trace!("Argument of {} bytes", declared);

        let mut payload = Vec::with_capacity(multibulk::prealloc(declared));
        source.by_ref().take(declared as u64).read_to_end(&mut payload)?;
        if payload.len() < declared {
            let at_end = source.fill_buf()?.is_empty();
            multibulk::check_payload(declared, payload.len(), at_end)?;
        }

        for expected in CRLF {
            multibulk::check_terminator(expected, read_byte(source))?;
        }

        Ok(Bytes::from(payload))
    }
}

fn read_byte<R: Read>(source: &mut R) -> std::io::Result<u8> {
    let mut byte = [0u8; 1];
    source.read_exact(&mut byte)?;
    Ok(byte[0])
}

/// Iterator returned by [`RequestDecoder::requests`].
pub struct Requests<'a, R> {
    decoder: &'a RequestDecoder,
    source: R,
    done: bool,
}

impl<R: BufRead> Iterator for Requests<'_, R> {
    type Item = Result<Request, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.decoder.next_request(&mut self.source) {
            Ok(Some(request)) => Some(Ok(request)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = e.is_transport();
                Some(Err(e))
            }
        }
    }
}

/// Decode one request with the default limits.
pub fn decode_request<R: BufRead>(source: &mut R) -> Result<Request, DecodeError> {
    RequestDecoder::default().decode(source)
}
