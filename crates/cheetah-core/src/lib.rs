#![forbid(unsafe_code)]

//! Core: display metadata, character buffer encoding, and pixel buffers.
//!
//! Everything in this crate is pure data and pure functions. Network access
//! lives in `cheetah-client`, frame scheduling in `cheetah-runtime`.
//!
//! # Key Types
//!
//! - [`DisplayInfo`] - device capabilities (character buffer size, width, quirks)
//! - [`CharacterBuffer`] - fixed-length byte buffer produced by [`encode`]
//! - [`PixelBuffer`] - fixed-size row-major RGB frame painted by generators
//! - [`Rgb`] / [`Hsv`] - 8-bit and fixed-point color

pub mod color;
pub mod display_info;
pub mod fixed_point;
pub mod pixel_buffer;
pub mod text_encoder;

pub use color::{Hsv, Rgb};
pub use display_info::{DisplayInfo, InfoError, Quirk};
pub use pixel_buffer::{BYTES_PER_PIXEL, BufferSizeMismatch, PixelBuffer, byte_len};
pub use text_encoder::{CharacterBuffer, effective_length, encode, fit_line};

/// Monotonic time value handed to every generator.
///
/// Wall-clock sources use microseconds since the Unix epoch; synthetic
/// sources use a plain counter. Generators never assume which.
pub type Timestamp = i64;
