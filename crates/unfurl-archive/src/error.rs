//! Decode error type for untrusted archive payloads.

use thiserror::Error;

/// Errors produced while decoding a keyed-archive payload.
///
/// Payloads are remotely-supplied data; every variant here degrades to
/// "no metadata" at the resolution layer, never a crash.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload matches neither the binary nor the JSON-bridged encoding.
    #[error("payload is not a recognized keyed archive")]
    UnrecognizedFormat,

    /// The payload ended before a declared structure was complete.
    #[error("archive truncated: {0}")]
    Truncated(&'static str),

    /// The payload is structurally invalid.
    #[error("malformed archive: {0}")]
    Malformed(String),
}

/// Result type alias for archive decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;
