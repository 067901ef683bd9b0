//! Rendering of decoded requests for the command-line tool.

use serde_json::json;
use std::io;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::cli::OutputFormat;
use crate::config::OutputConfig;
use crate::error::DecodeError;
use crate::metrics::{Metrics, Timer};
use crate::protocol::{Request, RequestDecoder};

/// Outcome of draining one source.
#[derive(Debug, Default)]
pub struct Summary {
    pub requests: u64,
    pub protocol_errors: u64,
    /// Set when the source failed or closed mid-request; decoding stopped there.
    pub transport_error: Option<DecodeError>,
}

/// Render a request as a single output line, without the trailing newline.
///
/// JSON output decodes arguments lossily; text output escapes every
/// non-printable byte so binary payloads stay on one line.
pub fn render(request: &Request, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let args: Vec<_> = request
                .args()
                .iter()
                .map(|arg| String::from_utf8_lossy(arg).into_owned())
                .collect();
            json!({
                "name": request.name(),
                "format": request.format().as_str(),
                "args": args,
            })
            .to_string()
        }
        OutputFormat::Text => {
            let mut line = request.name().to_string();
            for arg in request.args() {
                line.push_str(&format!(" \"{}\"", arg.escape_ascii()));
            }
            line
        }
    }
}

/// Decode every request in `source` and write one rendered line per request
/// to `sink`.
///
/// Protocol errors are counted and logged; decoding stops at the first one
/// unless `keep_going` is set. A transport error ends decoding and is handed
/// back in the summary. The sink is flushed before returning in both cases;
/// only a failing sink yields `Err`.
pub async fn write_requests<R, W>(
    decoder: &RequestDecoder,
    source: &mut R,
    sink: &mut W,
    config: &OutputConfig,
    metrics: &Metrics,
) -> io::Result<Summary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = Summary::default();

    loop {
        let timer = Timer::new();
        match decoder.next_request_async(source).await {
            Ok(Some(request)) => {
                metrics.record_request(&request, timer.elapsed_seconds());
                summary.requests += 1;
                debug!("Decoded request: {:?}", request);

                let mut line = render(&request, &config.format);
                line.push('\n');
                sink.write_all(line.as_bytes()).await?;
            }
            Ok(None) => break,
            Err(DecodeError::Protocol(e)) => {
                metrics.record_protocol_error(&e);
                summary.protocol_errors += 1;
                warn!("Protocol error ({}): {}", e.kind(), e);
                if !config.keep_going {
                    break;
                }
            }
            Err(e) => {
                metrics.record_error(&e);
                summary.transport_error = Some(e);
                break;
            }
        }
    }

    sink.flush().await?;
    Ok(summary)
}
