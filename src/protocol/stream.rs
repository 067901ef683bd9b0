//! Async request decoding over tokio buffered readers.
//!
//! Same algorithm and limits as the blocking decoder; only the reads differ.

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tracing::trace;

use super::detector::{detect_format, FirstLine};
use super::multibulk::{self, CRLF};
use super::{InlineParser, ProtocolFormat, Request, RequestDecoder};
use crate::error::DecodeError;

impl RequestDecoder {
    /// Async counterpart of [`RequestDecoder::decode`].
    pub async fn decode_async<R>(&self, source: &mut R) -> Result<Request, DecodeError>
    where
        R: AsyncBufRead + Unpin,
    {
        let line = self.read_line_async(source).await?;
        trace!("First line: {:?}", String::from_utf8_lossy(&line));

        match detect_format(&line) {
            FirstLine::Multibulk(count) => {
                let count = multibulk::check_frame_count(&line, count, self.config())?;
                let name = self.read_argument_async(source).await?;

                let mut args = Vec::with_capacity(multibulk::prealloc(count - 1));
                for _ in 1..count {
                    args.push(self.read_argument_async(source).await?);
                }

                Ok(Request::from_parts(&name, args, ProtocolFormat::Multibulk))
            }
            FirstLine::Inline => Ok(InlineParser::parse(&line)),
        }
    }

    /// Async counterpart of [`RequestDecoder::next_request`].
    pub async fn next_request_async<R>(&self, source: &mut R) -> Result<Option<Request>, DecodeError>
    where
        R: AsyncBufRead + Unpin,
    {
        if source.fill_buf().await?.is_empty() {
            return Ok(None);
        }
        self.decode_async(source).await.map(Some)
    }

    async fn read_line_async<R>(&self, source: &mut R) -> Result<Vec<u8>, DecodeError>
    where
        R: AsyncBufRead + Unpin,
    {
        let limit = self.config().max_line_len;
        let mut line = Vec::new();
        (&mut *source).take(limit as u64).read_until(b'\n', &mut line).await?;
        multibulk::check_line(&line, limit)?;
        Ok(line)
    }

    async fn read_argument_async<R>(&self, source: &mut R) -> Result<Bytes, DecodeError>
    where
        R: AsyncBufRead + Unpin,
    {
        let line = self.read_line_async(source).await?;
        let declared = multibulk::parse_argument_header(&line, self.config())?;
        trace!("Argument of {} bytes", declared);

        let mut payload = Vec::with_capacity(multibulk::prealloc(declared));
        (&mut *source).take(declared as u64).read_to_end(&mut payload).await?;
        if payload.len() < declared {
            let at_end = source.fill_buf().await?.is_empty();
            multibulk::check_payload(declared, payload.len(), at_end)?;
        }

        for expected in CRLF {
            multibulk::check_terminator(expected, source.read_u8().await)?;
        }

        Ok(Bytes::from(payload))
    }
}
