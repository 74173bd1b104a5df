#![forbid(unsafe_code)]

//! 8-bit RGB and fixed-point HSV color.

use serde::{Deserialize, Serialize};

use crate::fixed_point::{FX_ONE, Fx, fx, unfx, unfx_round};

/// An opaque 8-bit-per-channel color.
///
/// Serializes as `{"r": .., "g": .., "b": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as a byte triple, in wire order.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Blend toward `other` by a fixed-point weight clamped to `[0, FX_ONE]`.
    #[inline]
    pub fn lerp_fx(self, other: Self, weight: Fx) -> Self {
        let w = weight.clamp(0, FX_ONE);
        let inv = FX_ONE - w;
        let mix = |a: u8, b: u8| unfx_round(i32::from(a) * inv + i32::from(b) * w) as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    /// Blend toward `other` by a float weight clamped to `[0.0, 1.0]`.
    #[inline]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t256 = (t.clamp(0.0, 1.0) * 256.0) as u32;
        let inv = 256 - t256;
        let mix = |a: u8, b: u8| ((u32::from(a) * inv + u32::from(b) * t256) >> 8) as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

/// Fixed-point HSV: hue in degrees, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hsv {
    pub h: Fx,
    pub s: Fx,
    pub v: Fx,
}

impl Hsv {
    #[inline]
    pub const fn new(h: Fx, s: Fx, v: Fx) -> Self {
        Self { h, s, v }
    }

    /// Hue in fixed-point degrees; saturation and value as 0..=255.
    #[inline]
    pub fn from_u8(h: Fx, s: u8, v: u8) -> Self {
        Self::new(h, fx(i32::from(s)) / 255, fx(i32::from(v)) / 255)
    }

    /// Convert to RGB. Hues outside `[0, 360)` are treated as `0`.
    pub fn to_rgb(self) -> Rgb {
        let v = self.v.clamp(0, FX_ONE);
        let s = self.s.clamp(0, FX_ONE);
        let channel = |x: Fx| unfx_round(x * 255).clamp(0, 255) as u8;

        if s == 0 {
            let grey = channel(v);
            return Rgb::new(grey, grey, grey);
        }

        let hue = if (0..fx(360)).contains(&self.h) {
            self.h
        } else {
            0
        };
        let hue = hue / 60;
        let sector = unfx(hue);
        let rem = hue - fx(sector);

        let p = unfx(v * (FX_ONE - s));
        let q = unfx(v * (FX_ONE - unfx(s * rem)));
        let t = unfx(v * (FX_ONE - unfx(s * (FX_ONE - rem))));

        let (r, g, b) = match sector {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Rgb::new(channel(r), channel(g), channel(b))
    }
}
