//! Kitty graphics protocol frame encoder.
//!
//! Images are sent as a run of APC strings, each carrying at most
//! [`ENCODED_CHUNK_SIZE`] bytes of base64:
//!
//! ```text
//! ESC _ G a=T,f=32,s=<w>,v=<h>,m=1;<base64> ESC \     first frame
//! ESC _ G m=1;<base64> ESC \                          continuation
//! ESC _ G m=0;<base64> ESC \                          last frame
//! ```
//!
//! A single-frame image carries `m=0` on its first (and only) frame.
//!
//! Reference: <https://sw.kovidgoyal.net/kitty/graphics-protocol/>

use std::io::Write;

use base64::Engine;

use crate::error::GraphicsError;
use crate::types::{image_byte_len, FrameKind, PixelFormat, BYTES_PER_PIXEL};

/// Raw bytes per frame. Divisible by 3 (no padding mid-stream) and by 4
/// (no pixel split across frames).
pub const RAW_CHUNK_SIZE: usize = 3072;

/// Base64 bytes per full frame.
pub const ENCODED_CHUNK_SIZE: usize = 4096;

const _: () = assert!(ENCODED_CHUNK_SIZE == RAW_CHUNK_SIZE / 3 * 4);
const _: () = assert!(RAW_CHUNK_SIZE % BYTES_PER_PIXEL == 0);

/// APC introducer followed by the graphics command letter.
pub const APC_START: &[u8] = b"\x1b_G";

/// String terminator closing every frame.
pub const ST: &[u8] = b"\x1b\\";

/// Control data written before a frame's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHeader {
    /// Opens an image; the only header that carries dimensions.
    First {
        width: u32,
        height: u32,
        more: bool,
        kind: FrameKind,
    },
    /// Every later frame of the same image.
    Continuation { more: bool },
}

impl FrameHeader {
    /// Write the header, including `ESC _ G` and the trailing `;`.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> std::io::Result<()> {
        sink.write_all(APC_START)?;
        match *self {
            FrameHeader::First {
                width,
                height,
                more,
                kind,
            } => {
                let quiet = match kind {
                    FrameKind::Plain => "",
                    FrameKind::Quiet => "q=2,",
                };
                write!(
                    sink,
                    "a=T,{quiet}f=32,s={width},v={height},m={};",
                    u8::from(more)
                )
            }
            FrameHeader::Continuation { more } => write!(sink, "m={};", u8::from(more)),
        }
    }

    /// The `m` flag: whether another frame of the same image follows.
    pub fn more(&self) -> bool {
        match *self {
            FrameHeader::First { more, .. } | FrameHeader::Continuation { more } => more,
        }
    }
}

/// Streaming encoder with reusable scratch space.
///
/// Holds one raw chunk buffer and one base64 buffer. Neither escapes the
/// encoder and both are overwritten on every frame, so a single instance can
/// be reused for any number of images. Use one encoder per thread.
pub struct KittyEncoder {
    chunk: [u8; RAW_CHUNK_SIZE],
    encoded: [u8; ENCODED_CHUNK_SIZE],
}

impl Default for KittyEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KittyEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KittyEncoder").finish_non_exhaustive()
    }
}

impl KittyEncoder {
    pub fn new() -> Self {
        Self {
            chunk: [0; RAW_CHUNK_SIZE],
            encoded: [0; ENCODED_CHUNK_SIZE],
        }
    }

    /// Write a complete frame sequence for a `width` x `height` image.
    ///
    /// `pixels` holds native-endian 32-bit words in `format` channel order and
    /// must be at least `width * height * 4` bytes; extra bytes are ignored.
    /// Returns the number of frames written. A zero-sized image writes nothing.
    ///
    /// # Errors
    ///
    /// `InvalidDimensions` or `BufferTooSmall` before any output is written;
    /// `Io` if the sink fails partway through.
    pub fn encode<W: Write + ?Sized>(
        &mut self,
        sink: &mut W,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: PixelFormat,
        kind: FrameKind,
    ) -> Result<usize, GraphicsError> {
        let total = image_byte_len(width, height)?;
        if pixels.len() < total {
            return Err(GraphicsError::BufferTooSmall {
                len: pixels.len(),
                required: total,
            });
        }
        log::debug!("kitty encode: {width}x{height} {format}, {total} bytes, {kind:?}");
        self.stream(sink, &pixels[..total], width, height, format, kind)
    }

    /// Stream arbitrary bytes as `f=32` frames under the given dimensions.
    ///
    /// No conversion and no length check against `width`/`height`; the bytes
    /// go out exactly as given, including a tail that is not a whole pixel.
    pub fn encode_raw<W: Write + ?Sized>(
        &mut self,
        sink: &mut W,
        data: &[u8],
        width: u32,
        height: u32,
        kind: FrameKind,
    ) -> Result<usize, GraphicsError> {
        log::debug!("kitty encode_raw: {width}x{height}, {} bytes", data.len());
        self.stream(sink, data, width, height, PixelFormat::Rgba, kind)
    }

    /// [`encode`](Self::encode) into a fresh buffer.
    pub fn encode_to_vec(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: PixelFormat,
        kind: FrameKind,
    ) -> Result<Vec<u8>, GraphicsError> {
        let mut out = Vec::with_capacity(encoded_stream_len(pixels.len()));
        self.encode(&mut out, pixels, width, height, format, kind)?;
        Ok(out)
    }

    fn stream<W: Write + ?Sized>(
        &mut self,
        sink: &mut W,
        data: &[u8],
        width: u32,
        height: u32,
        format: PixelFormat,
        kind: FrameKind,
    ) -> Result<usize, GraphicsError> {
        let engine = base64::engine::general_purpose::STANDARD;
        let total = data.len();
        let mut offset = 0;
        let mut frames = 0;

        while offset < total {
            let chunk_size = (total - offset).min(RAW_CHUNK_SIZE);
            let src = &data[offset..offset + chunk_size];

            let raw: &[u8] = if format.is_identity() {
                src
            } else {
                debug_assert_eq!(chunk_size % BYTES_PER_PIXEL, 0);
                let n = format.adapt_chunk(src, &mut self.chunk);
                &self.chunk[..n]
            };

            let encoded_len = engine.encode_slice(raw, &mut self.encoded)?;
            let more = offset + chunk_size < total;

            let header = if frames == 0 {
                FrameHeader::First {
                    width,
                    height,
                    more,
                    kind,
                }
            } else {
                FrameHeader::Continuation { more }
            };
            header.write_to(sink)?;
            sink.write_all(&self.encoded[..encoded_len])?;
            sink.write_all(ST)?;

            log::trace!(
                "kitty frame {frames}: {chunk_size} raw bytes, {encoded_len} encoded, m={}",
                u8::from(header.more())
            );
            offset += chunk_size;
            frames += 1;
        }

        Ok(frames)
    }
}

/// Number of frames needed for `byte_len` bytes of pixel data.
pub fn frame_count(byte_len: usize) -> usize {
    byte_len.div_ceil(RAW_CHUNK_SIZE)
}

/// Rough upper bound of the encoded stream size, used to presize buffers.
fn encoded_stream_len(byte_len: usize) -> usize {
    const FIRST_HEADER_MAX: usize = 64;
    const FRAME_OVERHEAD: usize = 16;
    byte_len.div_ceil(3) * 4 + frame_count(byte_len) * FRAME_OVERHEAD + FIRST_HEADER_MAX
}

/// Write an RGBA image with the plain header dialect.
pub fn write_rgba32<W: Write + ?Sized>(
    sink: &mut W,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<usize, GraphicsError> {
    KittyEncoder::new().encode(
        sink,
        pixels,
        width,
        height,
        PixelFormat::Rgba,
        FrameKind::Plain,
    )
}

/// Write an RGBA image to stdout and flush.
pub fn print_rgba32(pixels: &[u8], width: u32, height: u32) -> Result<usize, GraphicsError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let frames = write_rgba32(&mut out, pixels, width, height)?;
    out.flush()?;
    Ok(frames)
}
