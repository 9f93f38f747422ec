//! Error types for the graphics protocol encoder and inspector.

/// Errors that can occur while encoding or inspecting graphics frames.
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    /// The pixel byte count `width * height * 4` does not fit in `usize`.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The pixel buffer is shorter than the declared dimensions require.
    #[error("pixel buffer too small: {len} bytes (need {required} bytes)")]
    BufferTooSmall { len: usize, required: usize },

    /// The base64 primitive rejected a chunk.
    #[error("base64 encode error: {0}")]
    Encode(#[from] base64::EncodeSliceError),

    /// Base64 decoding failed.
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// An error occurred while parsing a graphics protocol frame.
    #[error("parse error: {0}")]
    ParseError(String),

    /// A chunked transfer ended early or its flags were inconsistent.
    #[error("incomplete chunked transfer: {0}")]
    IncompleteTransfer(String),

    /// The output sink (or input source) failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
