use bytes::Bytes;

use super::ProtocolFormat;

/// One decoded client command.
///
/// `name` is lowercased exactly once, at construction; argument bytes are
/// kept as they arrived on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    name: String,
    args: Vec<Bytes>,
    format: ProtocolFormat,
}

impl Request {
    /// Build a request from the raw command-name bytes and its arguments.
    pub fn from_parts(raw_name: &[u8], args: Vec<Bytes>, format: ProtocolFormat) -> Self {
        Self {
            name: normalize_name(raw_name),
            args,
            format,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&Bytes> {
        self.args.get(index)
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Wire form the request arrived in.
    pub fn format(&self) -> ProtocolFormat {
        self.format
    }

    pub fn into_parts(self) -> (String, Vec<Bytes>) {
        (self.name, self.args)
    }
}

/// Lowercase a command name. Bytes that are not UTF-8 become U+FFFD.
pub fn normalize_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_lowercase()
}
