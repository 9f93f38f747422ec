//! Kitty graphics protocol output for 32-bit pixel buffers.
//!
//! Terminals cap the payload of a single control sequence, so an image is
//! sent as a run of APC frames, each holding the base64 encoding of at most
//! 3072 raw bytes:
//!
//! ```text
//! pixel buffer (native u32 words)
//!     │
//!     ▼
//! PixelFormat::adapt_chunk()      ← ARGB/ABGR → RGBA, per 3072-byte chunk
//!     │
//!     ▼
//! base64 encode_slice()           ← ≤ 4096 bytes, no line wrapping
//!     │
//!     ▼
//! FrameHeader::write_to() + payload + ST
//!     │
//!     ▼
//! io::Write sink
//! ```
//!
//! [`protocol::inspect`] walks the other direction and is used to verify
//! encoded streams.
//!
//! # Example
//!
//! ```
//! use pixwire_graphics::{FrameKind, KittyEncoder, PixelFormat};
//!
//! let pixels = [0xffu8, 0, 0, 0xff, 0, 0xff, 0, 0xff];
//! let mut out = Vec::new();
//! let frames = KittyEncoder::new()
//!     .encode(&mut out, &pixels, 2, 1, PixelFormat::Rgba, FrameKind::Plain)
//!     .unwrap();
//! assert_eq!(frames, 1);
//! assert!(out.starts_with(b"\x1b_Ga=T,f=32,s=2,v=1,m=0;"));
//! ```

pub mod error;
pub mod protocol;
pub mod types;

pub use error::GraphicsError;
pub use protocol::inspect::{reassemble, DecodedImage};
pub use protocol::kitty::{print_rgba32, write_rgba32, FrameHeader, KittyEncoder};
pub use types::{FrameKind, PixelFormat};
