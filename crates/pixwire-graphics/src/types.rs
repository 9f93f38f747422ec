//! Core types for the frame encoder.
//!
//! Pixel buffers are plain byte slices holding packed 32-bit words in the
//! platform's native byte order. The Kitty protocol wants RGBA bytes on the
//! wire, so any other channel order is converted chunk by chunk while
//! streaming.

use serde::{Deserialize, Serialize};

use crate::error::GraphicsError;

/// Bytes per pixel for every supported format.
pub const BYTES_PER_PIXEL: usize = 4;

/// Channel order of the source pixel words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Already in transmission order; sent verbatim.
    #[default]
    Rgba,
    /// Words packed as `0xAARRGGBB`; alpha moves to the low byte.
    Argb,
    /// Words whose byte order is the exact reverse of RGBA.
    Abgr,
}

impl PixelFormat {
    /// Convert one native pixel word into its transmitted form.
    #[inline]
    pub fn adapt(self, pixel: u32) -> u32 {
        match self {
            PixelFormat::Rgba => pixel,
            PixelFormat::Argb => argb_to_rgba(pixel),
            PixelFormat::Abgr => abgr_to_rgba(pixel),
        }
    }

    /// Whether the format goes on the wire without conversion.
    pub fn is_identity(self) -> bool {
        self == PixelFormat::Rgba
    }

    /// Convert whole pixels from `src` into `dst`.
    ///
    /// Both slices are walked four bytes at a time; the shorter one bounds the
    /// number of pixels converted. Returns the number of bytes written.
    pub fn adapt_chunk(self, src: &[u8], dst: &mut [u8]) -> usize {
        let mut written = 0;
        for (from, to) in src
            .chunks_exact(BYTES_PER_PIXEL)
            .zip(dst.chunks_exact_mut(BYTES_PER_PIXEL))
        {
            let word = u32::from_ne_bytes([from[0], from[1], from[2], from[3]]);
            to.copy_from_slice(&self.adapt(word).to_ne_bytes());
            written += BYTES_PER_PIXEL;
        }
        written
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PixelFormat::Rgba => "rgba",
            PixelFormat::Argb => "argb",
            PixelFormat::Abgr => "abgr",
        })
    }
}

impl std::str::FromStr for PixelFormat {
    type Err = GraphicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgba" => Ok(PixelFormat::Rgba),
            "argb" => Ok(PixelFormat::Argb),
            "abgr" => Ok(PixelFormat::Abgr),
            other => Err(GraphicsError::ParseError(format!(
                "unknown pixel format: {other}"
            ))),
        }
    }
}

/// Drop alpha from the high byte, shift RGB up, and put alpha in the low byte.
#[inline]
pub fn argb_to_rgba(pixel: u32) -> u32 {
    ((pixel & 0x00FF_FFFF) << 8) | ((pixel & 0xFF00_0000) >> 24)
}

#[inline]
pub fn abgr_to_rgba(pixel: u32) -> u32 {
    pixel.swap_bytes()
}

/// Header dialect used for the first frame of an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// `a=T,f=32,...`: the terminal answers with OK/error responses.
    #[default]
    Plain,
    /// `a=T,q=2,f=32,...`: all terminal responses suppressed.
    Quiet,
}

impl FrameKind {
    pub fn from_quiet(quiet: bool) -> Self {
        if quiet {
            FrameKind::Quiet
        } else {
            FrameKind::Plain
        }
    }
}

/// Number of pixel bytes for an image, or an error if it overflows `usize`.
pub fn image_byte_len(width: u32, height: u32) -> Result<usize, GraphicsError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
        .ok_or(GraphicsError::InvalidDimensions { width, height })
}
