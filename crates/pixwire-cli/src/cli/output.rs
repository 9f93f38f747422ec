//! Formatted table output for the `inspect` command.

use std::io::{self, Write};

use pixwire_graphics::protocol::inspect::KittyFrame;
use pixwire_graphics::DecodedImage;

/// One scanned frame with its position in the stream.
pub struct FrameRow<'a> {
    pub start: usize,
    pub end: usize,
    pub control: &'a str,
    pub frame: &'a KittyFrame,
}

/// Print scanned frames as a formatted table.
pub fn print_frame_table<W: Write>(out: &mut W, rows: &[FrameRow<'_>]) -> io::Result<()> {
    writeln!(
        out,
        "{:<6} {:<10} {:<8} {:<8} {:<2} CONTROL",
        "FRAME", "OFFSET", "LEN", "PAYLOAD", "M"
    )?;
    for (i, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:<6} {:<10} {:<8} {:<8} {:<2} {}",
            i,
            row.start,
            row.end - row.start,
            row.frame.payload.len(),
            u8::from(row.frame.more),
            truncate(row.control, 40),
        )?;
    }
    Ok(())
}

/// Print the verification summary for a reassembled image.
pub fn print_summary<W: Write>(out: &mut W, image: &DecodedImage) -> io::Result<()> {
    writeln!(
        out,
        "ok: {}x{} image, {} frames, {} pixel bytes, q={}",
        image.width,
        image.height,
        image.frames,
        image.data.len(),
        image.quiet,
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let target = max.saturating_sub(3);
        let end = s
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= target)
            .last()
            .unwrap_or(0);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixwire_graphics::protocol::inspect::parse_frame;

    #[test]
    fn test_truncate_shorter_than_max() {
        assert_eq!(truncate("m=0", 10), "m=0");
    }

    #[test]
    fn test_truncate_exact_max_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_longer_than_max() {
        assert_eq!(truncate("a=T,q=2,f=32", 8), "a=T,q...");
    }

    #[test]
    fn test_truncate_max_zero() {
        assert_eq!(truncate("hello", 0), "...");
    }

    #[test]
    fn test_frame_table_rows() {
        let frame = parse_frame(b"a=T,f=32,s=1,v=1,m=0;AAAAAA==").unwrap();
        let rows = [FrameRow {
            start: 3,
            end: 40,
            control: "a=T,f=32,s=1,v=1,m=0",
            frame: &frame,
        }];
        let mut out = Vec::new();
        print_frame_table(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("FRAME"));
        assert!(lines[1].starts_with("0      3          37       8        0  a=T,f=32"));
    }

    #[test]
    fn test_summary_line() {
        let image = DecodedImage {
            width: 2,
            height: 1,
            quiet: 2,
            frames: 1,
            data: vec![0; 8],
        };
        let mut out = Vec::new();
        print_summary(&mut out, &image).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ok: 2x1 image, 1 frames, 8 pixel bytes, q=2\n"
        );
    }
}
