//! Command handlers. Each writes to a caller-supplied sink so the frame
//! stream can be captured in tests.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{bail, Context};
use pixwire_config::PixwireConfig;
use pixwire_graphics::protocol::inspect::{parse_frame, reassemble, FrameScanner};
use pixwire_graphics::types::image_byte_len;
use pixwire_graphics::{FrameKind, KittyEncoder, PixelFormat};

use super::output::{print_frame_table, print_summary, FrameRow};

/// Encode an image held in memory, honoring config defaults and limits.
///
/// `quiet` overrides `encode.quiet` in either direction when set.
pub fn show_pixels<W: Write>(
    out: &mut W,
    config: &PixwireConfig,
    pixels: &[u8],
    width: u32,
    height: u32,
    format: Option<PixelFormat>,
    quiet: Option<bool>,
) -> anyhow::Result<usize> {
    check_limit(config, width, height)?;

    let format = format.unwrap_or(config.encode.pixel_format);
    let kind = quiet
        .map(FrameKind::from_quiet)
        .unwrap_or_else(|| config.encode.frame_kind());

    let frames = KittyEncoder::new().encode(out, pixels, width, height, format, kind)?;
    out.flush()?;
    Ok(frames)
}

/// Reject images above `limits.max_image_bytes`. Returns the pixel byte count.
fn check_limit(config: &PixwireConfig, width: u32, height: u32) -> anyhow::Result<usize> {
    let required = image_byte_len(width, height)?;
    let limit = config.limits.max_image_bytes;
    if required > limit {
        log::warn!("refusing {width}x{height} image: {required} bytes exceeds limit {limit}");
        bail!("image is {required} bytes, larger than limits.max_image_bytes ({limit})");
    }
    Ok(required)
}

/// Read at most `len` bytes from the start of `file`.
fn read_pixels(file: &Path, len: usize) -> anyhow::Result<Vec<u8>> {
    let mut pixels = Vec::with_capacity(len);
    File::open(file)
        .and_then(|f| f.take(len as u64).read_to_end(&mut pixels))
        .with_context(|| format!("failed to read {}", file.display()))?;
    Ok(pixels)
}

/// `pixwire show`: read a raw pixel file and encode it.
///
/// The size limit is checked before the file is opened, and only the bytes
/// the image needs are read; anything after them is ignored.
pub fn show_file<W: Write>(
    out: &mut W,
    config: &PixwireConfig,
    file: &Path,
    width: u32,
    height: u32,
    format: Option<PixelFormat>,
    quiet: Option<bool>,
) -> anyhow::Result<usize> {
    let required = check_limit(config, width, height)?;
    let pixels = read_pixels(file, required)?;
    log::debug!("read {} bytes from {}", pixels.len(), file.display());
    show_pixels(out, config, &pixels, width, height, format, quiet)
}

/// `pixwire pattern`: encode a generated gradient.
pub fn show_pattern<W: Write>(
    out: &mut W,
    config: &PixwireConfig,
    width: u32,
    height: u32,
    quiet: Option<bool>,
) -> anyhow::Result<usize> {
    check_limit(config, width, height)?;
    let pixels = gradient(width, height);
    show_pixels(out, config, &pixels, width, height, Some(PixelFormat::Rgba), quiet)
}

/// RGBA test image: red grows left to right, green top to bottom.
pub fn gradient(width: u32, height: u32) -> Vec<u8> {
    let scale = |v: u32, max: u32| {
        let span = u64::from(max.saturating_sub(1).max(1));
        (u64::from(v) * 255 / span) as u8
    };
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let r = scale(x, width);
            let g = scale(y, height);
            pixels.extend_from_slice(&[r, g, 255 - r / 2 - g / 2, 0xff]);
        }
    }
    pixels
}

/// `pixwire inspect`: list frames and verify the stream reassembles.
pub fn inspect<W: Write>(out: &mut W, stream: &[u8]) -> anyhow::Result<()> {
    let mut frames = Vec::new();
    for (start, end, body) in FrameScanner::new(stream) {
        let frame = parse_frame(body)
            .with_context(|| format!("malformed frame at offset {start}"))?;
        let control_len = body.iter().position(|&b| b == b';').unwrap_or(body.len());
        let control = String::from_utf8_lossy(&body[..control_len]).into_owned();
        frames.push((start, end, control, frame));
    }

    if frames.is_empty() {
        bail!("no graphics frames found in {} bytes of input", stream.len());
    }

    let rows: Vec<FrameRow<'_>> = frames
        .iter()
        .map(|(start, end, control, frame)| FrameRow {
            start: *start,
            end: *end,
            control,
            frame,
        })
        .collect();
    print_frame_table(out, &rows)?;

    let image = reassemble(stream).context("stream does not reassemble into an image")?;
    print_summary(out, &image)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_size_and_corners() {
        let px = gradient(4, 3);
        assert_eq!(px.len(), 4 * 3 * 4);
        assert_eq!(&px[0..4], &[0, 0, 255, 0xff]);
        let last = &px[px.len() - 4..];
        assert_eq!(last[0], 255);
        assert_eq!(last[1], 255);
    }

    #[test]
    fn test_gradient_single_pixel() {
        assert_eq!(gradient(1, 1), vec![0, 0, 255, 0xff]);
    }

    #[test]
    fn test_show_pixels_uses_config_defaults() {
        let mut config = PixwireConfig::default();
        config.encode.quiet = true;
        config.encode.pixel_format = PixelFormat::Abgr;

        let pixels = 0x0102_0304u32.to_ne_bytes();
        let mut out = Vec::new();
        let frames = show_pixels(&mut out, &config, &pixels, 1, 1, None, None).unwrap();
        assert_eq!(frames, 1);
        assert!(out.starts_with(b"\x1b_Ga=T,q=2,f=32,s=1,v=1,m=0;"));

        let image = reassemble(&out).unwrap();
        assert_eq!(image.data, 0x0403_0201u32.to_ne_bytes());
    }

    #[test]
    fn test_show_pixels_flag_overrides_format() {
        let config = PixwireConfig::default();
        let pixels = 0x8011_2233u32.to_ne_bytes();
        let mut out = Vec::new();
        show_pixels(&mut out, &config, &pixels, 1, 1, Some(PixelFormat::Argb), None).unwrap();
        assert!(out.starts_with(b"\x1b_Ga=T,f=32,"));
        assert_eq!(
            reassemble(&out).unwrap().data,
            0x1122_3380u32.to_ne_bytes()
        );
    }

    #[test]
    fn test_show_pixels_refuses_oversized_image() {
        let mut config = PixwireConfig::default();
        config.limits.max_image_bytes = 16;
        let mut out = Vec::new();
        let result = show_pixels(&mut out, &config, &[0u8; 20], 5, 1, None, None);
        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_show_pixels_short_buffer() {
        let config = PixwireConfig::default();
        let mut out = Vec::new();
        assert!(show_pixels(&mut out, &config, &[0u8; 4], 2, 1, None, None).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_show_file_missing() {
        let config = PixwireConfig::default();
        let mut out = Vec::new();
        let err = show_file(
            &mut out,
            &config,
            Path::new("/nonexistent/pixels.raw"),
            1,
            1,
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_show_file_checks_limit_before_opening() {
        let mut config = PixwireConfig::default();
        config.limits.max_image_bytes = 16;
        let mut out = Vec::new();
        let err = show_file(
            &mut out,
            &config,
            Path::new("/nonexistent/pixels.raw"),
            5,
            1,
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("limits.max_image_bytes"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_show_file_ignores_trailing_bytes() {
        let path =
            std::env::temp_dir().join(format!("pixwire-trailing-{}.raw", std::process::id()));
        let mut contents = vec![0x11u8; 8];
        contents.extend_from_slice(&[0xee; 4096]);
        std::fs::write(&path, &contents).unwrap();

        let config = PixwireConfig::default();
        let mut out = Vec::new();
        let result = show_file(&mut out, &config, &path, 2, 1, Some(PixelFormat::Rgba), None);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(result.unwrap(), 1);
        assert_eq!(reassemble(&out).unwrap().data, vec![0x11u8; 8]);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_pixels_stops_at_image_size() {
        let pixels = read_pixels(Path::new("/dev/zero"), 64).unwrap();
        assert_eq!(pixels, vec![0u8; 64]);
    }

    #[test]
    fn test_show_pixels_no_quiet_overrides_config() {
        let mut config = PixwireConfig::default();
        config.encode.quiet = true;
        let mut out = Vec::new();
        show_pixels(&mut out, &config, &[0u8; 4], 1, 1, None, Some(false)).unwrap();
        assert!(out.starts_with(b"\x1b_Ga=T,f=32,s=1,v=1,m=0;"));

        out.clear();
        show_pixels(&mut out, &config, &[0u8; 4], 1, 1, None, None).unwrap();
        assert!(out.starts_with(b"\x1b_Ga=T,q=2,f=32,"));
    }

    #[test]
    fn test_pattern_then_inspect() {
        let config = PixwireConfig::default();
        let mut stream = Vec::new();
        let frames = show_pattern(&mut stream, &config, 40, 30, None).unwrap();
        assert_eq!(frames, 2);

        let mut report = Vec::new();
        inspect(&mut report, &stream).unwrap();
        let text = String::from_utf8(report).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("a=T,f=32,s=40,v=30,m=1"));
        assert!(lines[2].ends_with("m=0"));
        assert_eq!(lines[3], "ok: 40x30 image, 2 frames, 4800 pixel bytes, q=0");
    }

    #[test]
    fn test_inspect_empty_input() {
        let mut report = Vec::new();
        assert!(inspect(&mut report, b"no graphics here").is_err());
    }

    #[test]
    fn test_inspect_truncated_stream() {
        let config = PixwireConfig::default();
        let mut stream = Vec::new();
        show_pattern(&mut stream, &config, 40, 30, Some(true)).unwrap();
        let (_, end, _) = FrameScanner::new(&stream).next().unwrap();

        let mut report = Vec::new();
        let err = inspect(&mut report, &stream[..end]).unwrap_err();
        assert!(err.to_string().contains("does not reassemble"));
        // The table is still printed before verification fails.
        assert!(String::from_utf8(report).unwrap().starts_with("FRAME"));
    }
}
