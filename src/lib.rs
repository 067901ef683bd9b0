pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod output;
pub mod protocol;
pub mod telemetry;

pub use config::{Config, DecoderConfig};
pub use error::{DecodeError, ProtocolError};
pub use protocol::{decode_request, ProtocolFormat, Request, RequestDecoder};
