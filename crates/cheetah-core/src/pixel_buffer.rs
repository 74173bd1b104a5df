#![forbid(unsafe_code)]

//! Row-major RGB pixel buffer.
//!
//! A [`PixelBuffer`] is the frame a generator paints into and a sink ships
//! to the device. Layout is fixed: three bytes per pixel in `r, g, b` order,
//! rows top to bottom, pixels left to right within a row.
//!
//! # Invariants
//!
//! - `bytes.len() == width * height * BYTES_PER_PIXEL`, always.
//! - Pixel `(x, y)` starts at byte `(y * width + x) * BYTES_PER_PIXEL`.
//! - The size is fixed at construction; painting never reallocates.
//!
//! [`PixelBuffer::bind`] is the only way to adopt caller-provided storage,
//! and it refuses storage of the wrong size without keeping any of it.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::color::Rgb;

/// Bytes per pixel (`r`, `g`, `b`).
pub const BYTES_PER_PIXEL: usize = 3;

/// Byte length of a `width x height` frame, or `None` if it overflows `usize`.
#[inline]
pub const fn byte_len(width: usize, height: usize) -> Option<usize> {
    match width.checked_mul(height) {
        Some(pixels) => pixels.checked_mul(BYTES_PER_PIXEL),
        None => None,
    }
}

/// Storage passed to [`PixelBuffer::bind`] does not match the dimensions.
///
/// `expected` is `None` when the dimensions describe more bytes than
/// `usize` can count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSizeMismatch {
    pub width: usize,
    pub height: usize,
    pub expected: Option<usize>,
    pub actual: usize,
}

impl fmt::Display for BufferSizeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expected {
            Some(expected) => write!(
                f,
                "pixel buffer for {}x{} needs {} bytes, got {}",
                self.width, self.height, expected, self.actual
            ),
            None => write!(
                f,
                "pixel buffer for {}x{} is too large to address, got {} bytes",
                self.width, self.height, self.actual
            ),
        }
    }
}

impl std::error::Error for BufferSizeMismatch {}

/// A `width x height` RGB frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    /// A black frame.
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 3` overflows `usize`. Callers taking
    /// dimensions from outside check them with [`byte_len`] first.
    pub fn new(width: usize, height: usize) -> Self {
        let Some(len) = byte_len(width, height) else {
            panic!("pixel buffer {width}x{height} overflows usize");
        };
        Self {
            width,
            height,
            bytes: vec![0; len],
        }
    }

    /// Adopt existing storage as a frame of the given size.
    ///
    /// Fails, consuming nothing but the argument, when `bytes` is not
    /// exactly `width * height * 3` long or that product overflows.
    pub fn bind(bytes: Vec<u8>, width: usize, height: usize) -> Result<Self, BufferSizeMismatch> {
        let expected = byte_len(width, height);
        if expected != Some(bytes.len()) {
            return Err(BufferSizeMismatch {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bytes,
        })
    }

    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels.
    #[inline]
    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Raw bytes, row-major.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Release the underlying storage.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) * BYTES_PER_PIXEL)
    }

    /// Color at `(x, y)`, or `None` out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        let at = self.offset(x, y)?;
        Some(Rgb::new(
            self.bytes[at],
            self.bytes[at + 1],
            self.bytes[at + 2],
        ))
    }

    /// Write `color` at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        if let Some(at) = self.offset(x, y) {
            self.bytes[at..at + BYTES_PER_PIXEL].copy_from_slice(&color.to_bytes());
        }
    }

    /// Paint every pixel with `color`.
    pub fn fill(&mut self, color: Rgb) {
        let px = color.to_bytes();
        for chunk in self.bytes.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Paint every pixel with the color `f(x, y)` returns, row by row.
    pub fn paint_with(&mut self, mut f: impl FnMut(usize, usize) -> Rgb) {
        let width = self.width;
        if width == 0 {
            return;
        }
        for (y, row) in self
            .bytes
            .chunks_exact_mut(width * BYTES_PER_PIXEL)
            .enumerate()
        {
            for (x, chunk) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                chunk.copy_from_slice(&f(x, y).to_bytes());
            }
        }
    }

    /// Copy another frame of the same size into this one.
    pub fn copy_from(&mut self, other: &Self) -> Result<(), BufferSizeMismatch> {
        if other.bytes.len() != self.bytes.len() {
            return Err(BufferSizeMismatch {
                width: self.width,
                height: self.height,
                expected: Some(self.bytes.len()),
                actual: other.bytes.len(),
            });
        }
        self.bytes.copy_from_slice(&other.bytes);
        Ok(())
    }

    /// Standard base64 of the raw bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}
