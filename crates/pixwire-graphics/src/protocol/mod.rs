//! Kitty graphics protocol support.
//!
//! - [`kitty`]: splits pixel buffers into base64 APC frames
//! - [`inspect`]: scans and reassembles frame streams

pub mod inspect;
pub mod kitty;
