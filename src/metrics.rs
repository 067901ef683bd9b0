use opentelemetry::metrics::{Counter, Histogram};
use opentelemetry::{global, KeyValue};
use std::sync::OnceLock;
use std::time::Instant;

use crate::error::{DecodeError, ProtocolError};
use crate::protocol::Request;

/// OpenTelemetry metrics for request decoding.
///
/// Recorded by callers of the decoder, never by the decoder itself.
/// Singleton instance accessed via `Metrics::get()`.
pub struct Metrics {
    pub requests_decoded_total: Counter<u64>,
    pub decode_duration: Histogram<f64>,
    pub argument_bytes_total: Counter<u64>,
    pub protocol_errors_total: Counter<u64>,
    pub transport_errors_total: Counter<u64>,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    pub fn init() -> &'static Self {
        METRICS.get_or_init(|| {
            let meter = global::meter("redis-request");

            Metrics {
                requests_decoded_total: meter
                    .u64_counter("requests_decoded_total")
                    .with_description("Total number of requests decoded")
                    .init(),

                decode_duration: meter
                    .f64_histogram("request_decode_duration_seconds")
                    .with_description("Time spent decoding one request in seconds")
                    .init(),

                argument_bytes_total: meter
                    .u64_counter("argument_bytes_total")
                    .with_description("Total argument payload bytes decoded")
                    .init(),

                protocol_errors_total: meter
                    .u64_counter("protocol_errors_total")
                    .with_description("Total number of malformed requests")
                    .init(),

                transport_errors_total: meter
                    .u64_counter("transport_errors_total")
                    .with_description("Total number of source read failures")
                    .init(),
            }
        })
    }

    pub fn get() -> &'static Self {
        METRICS.get().unwrap_or_else(|| Self::init())
    }

    pub fn record_request(&self, request: &Request, duration: f64) {
        let labels = &[KeyValue::new("format", request.format().as_str())];
        self.requests_decoded_total.add(1, labels);
        self.decode_duration.record(duration, labels);

        let bytes: usize = request.args().iter().map(|arg| arg.len()).sum();
        self.argument_bytes_total.add(bytes as u64, &[]);
    }

    pub fn record_error(&self, error: &DecodeError) {
        match error.protocol() {
            Some(e) => self.record_protocol_error(e),
            None => self.transport_errors_total.add(1, &[]),
        }
    }

    pub fn record_protocol_error(&self, error: &ProtocolError) {
        self.protocol_errors_total
            .add(1, &[KeyValue::new("kind", error.kind())]);
    }
}

// Timer utility for measuring durations
pub struct Timer {
    start: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
