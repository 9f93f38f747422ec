//! Reading frame streams back.
//!
//! Scans a byte stream for `ESC _ G <key>=<value>,...;<base64> ESC \`
//! sequences, parses their control data, and reassembles a chunked
//! transmission into the pixel bytes it carries. Used to verify what the
//! encoder wrote.

use base64::Engine;

use crate::error::GraphicsError;
use crate::protocol::kitty::{APC_START, ST};
use crate::types::image_byte_len;

/// Action requested by a frame's `a` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KittyAction {
    /// `a=t`: transmit only.
    Transmit,
    /// `a=T`: transmit and display.
    TransmitAndDisplay,
    /// `a=p`: display a previously transmitted image.
    Display,
    /// `a=d`: delete.
    Delete,
    /// `a=q`: query support.
    Query,
}

/// Control data and payload of one parsed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KittyFrame {
    /// `None` when the frame has no `a` key (continuation frames).
    pub action: Option<KittyAction>,
    /// Response suppression level (`q`).
    pub quiet: u8,
    /// Pixel format code (`f`); 32 means RGBA.
    pub format: Option<u32>,
    /// Width in pixels (`s`).
    pub width: Option<u32>,
    /// Height in pixels (`v`).
    pub height: Option<u32>,
    /// Whether more frames follow (`m=1`).
    pub more: bool,
    /// The base64 payload, still encoded.
    pub payload: Vec<u8>,
}

impl KittyFrame {
    /// Decode the base64 payload into raw bytes.
    pub fn decode_payload(&self) -> Result<Vec<u8>, GraphicsError> {
        if self.payload.is_empty() {
            return Ok(Vec::new());
        }
        let engine = base64::engine::general_purpose::STANDARD;
        engine
            .decode(&self.payload)
            .map_err(GraphicsError::Base64Decode)
    }

    /// Whether the frame carries image dimensions (i.e. opens an image).
    pub fn is_first(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

/// Iterator over complete graphics sequences in a buffer.
///
/// Yields `(start, end, body)`: `start..end` covers the whole sequence
/// including delimiters and `body` is the bytes between `ESC _ G` and `ESC \`.
/// Bytes outside sequences are skipped; an unterminated tail ends iteration.
#[derive(Debug, Clone)]
pub struct FrameScanner<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameScanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Offset of the first byte not yet consumed.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for FrameScanner<'a> {
    type Item = (usize, usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let buf = self.buf;
        let start = self.pos + find(&buf[self.pos..], APC_START)?;
        let body_start = start + APC_START.len();
        let body_len = find(&buf[body_start..], ST)?;
        let end = body_start + body_len + ST.len();
        self.pos = end;
        Some((start, end, &buf[body_start..body_start + body_len]))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Parse a frame body: the bytes between `ESC _ G` and `ESC \`.
///
/// # Errors
///
/// Returns `GraphicsError::ParseError` for non-UTF-8 input, a pair without
/// `=`, or a numeric key with a non-numeric value.
pub fn parse_frame(body: &[u8]) -> Result<KittyFrame, GraphicsError> {
    let body = std::str::from_utf8(body)
        .map_err(|e| GraphicsError::ParseError(format!("invalid UTF-8: {e}")))?;

    let (params, payload) = match body.find(';') {
        Some(pos) => (&body[..pos], &body[pos + 1..]),
        None => (body, ""),
    };

    let mut frame = KittyFrame {
        action: None,
        quiet: 0,
        format: None,
        width: None,
        height: None,
        more: false,
        payload: payload.as_bytes().to_vec(),
    };

    for pair in params.split(',') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            GraphicsError::ParseError(format!("invalid key-value pair: {pair}"))
        })?;

        match key {
            "a" => {
                frame.action = Some(match value {
                    "t" => KittyAction::Transmit,
                    "T" => KittyAction::TransmitAndDisplay,
                    "p" => KittyAction::Display,
                    "d" | "D" => KittyAction::Delete,
                    "q" => KittyAction::Query,
                    _ => {
                        return Err(GraphicsError::ParseError(format!(
                            "unknown action: {value}"
                        )));
                    }
                });
            }
            "q" => {
                frame.quiet = value
                    .parse::<u8>()
                    .map_err(|e| GraphicsError::ParseError(format!("invalid quiet: {e}")))?;
            }
            "f" => frame.format = Some(parse_u32(value, "format")?),
            "s" => frame.width = Some(parse_u32(value, "width")?),
            "v" => frame.height = Some(parse_u32(value, "height")?),
            "m" => frame.more = value == "1",
            _ => {
                log::trace!("ignoring unknown kitty graphics key: {key}={value}");
            }
        }
    }

    Ok(frame)
}

fn parse_u32(value: &str, context: &str) -> Result<u32, GraphicsError> {
    value
        .parse::<u32>()
        .map_err(|e| GraphicsError::ParseError(format!("invalid {context}: {e}")))
}

/// An image recovered from a frame stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// `q` value of the first frame.
    pub quiet: u8,
    /// Number of frames the image was split into.
    pub frames: usize,
    /// Transmitted pixel bytes, in wire (RGBA) order.
    pub data: Vec<u8>,
}

/// Reassemble the single image carried by `stream`.
///
/// Requires the first frame to carry `s`/`v`, `m=1` on every frame but the
/// last, `m=0` on the last, no further frames afterwards, and a decoded
/// length of exactly `width * height * 4`. Each payload is decoded on its
/// own, so any chunk may end in `=` padding.
pub fn reassemble(stream: &[u8]) -> Result<DecodedImage, GraphicsError> {
    let mut scanner = FrameScanner::new(stream);

    let (_, _, body) = scanner
        .next()
        .ok_or_else(|| GraphicsError::IncompleteTransfer("no graphics frames".into()))?;
    let first = parse_frame(body)?;
    let (width, height) = match (first.width, first.height) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            return Err(GraphicsError::ParseError(
                "first frame lacks s/v dimensions".into(),
            ))
        }
    };

    let mut data = first.decode_payload()?;
    let mut more = first.more;
    let mut frames = 1;

    while more {
        let (_, _, body) = scanner.next().ok_or_else(|| {
            GraphicsError::IncompleteTransfer(format!("stream ended after {frames} frames with m=1"))
        })?;
        let frame = parse_frame(body)?;
        if frame.is_first() {
            return Err(GraphicsError::ParseError(format!(
                "continuation frame {frames} carries dimensions"
            )));
        }
        data.extend(frame.decode_payload()?);
        frames += 1;
        more = frame.more;
    }

    if scanner.next().is_some() {
        return Err(GraphicsError::IncompleteTransfer(format!(
            "frames follow the final m=0 frame {}",
            frames - 1
        )));
    }

    let expected = image_byte_len(width, height)?;
    if data.len() != expected {
        return Err(GraphicsError::IncompleteTransfer(format!(
            "decoded {} bytes, {width}x{height} needs {expected}",
            data.len()
        )));
    }

    log::debug!("reassembled {width}x{height} image from {frames} frames");
    Ok(DecodedImage {
        width,
        height,
        quiet: first.quiet,
        frames,
        data,
    })
}
