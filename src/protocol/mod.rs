//! Request decoding for the Redis multibulk protocol with inline fallback.

pub mod decoder;
pub mod detector;
pub mod inline;
pub mod multibulk;
pub mod request;
pub mod stream;

pub use decoder::{decode_request, RequestDecoder, Requests};
pub use detector::{detect_format, FirstLine, ProtocolFormat};
pub use inline::InlineParser;
pub use request::{normalize_name, Request};
