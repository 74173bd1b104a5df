#![forbid(unsafe_code)]

//! Plasma fields.
//!
//! Deterministic: the field is a closed-form function of pixel position
//! and time, so identical `(t, params, size)` always yields identical bytes.

use cheetah_core::fixed_point::{FRAC_BITS, fx};
use cheetah_core::{Hsv, PixelBuffer, Rgb, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{AnimationGenerator, ParamSpec};

// ---------------------------------------------------------------------------
// Wave Function
// ---------------------------------------------------------------------------

/// Plasma intensity at wave-space coordinates `(x, y)`, in `[0.0, 1.0]`.
///
/// Six superposed terms:
/// - horizontal, vertical and diagonal plane waves;
/// - two radial waves (origin and `(3, 3)`);
/// - an interference term.
///
/// A slow breathing envelope modulates the amplitude.
#[inline]
pub fn field(x: f64, y: f64, time: f64) -> f64 {
    let v1 = (x * 1.5 + time).sin();
    let v2 = (y * 1.8 + time * 0.8).sin();
    let v3 = ((x + y) * 1.2 + time * 0.6).sin();
    let v4 = ((x * x + y * y).sqrt() * 2.0 - time * 1.2).sin();
    let v5 = (((x - 3.0).powi(2) + (y - 3.0).powi(2)).sqrt() * 1.8 + time).cos();
    let v6 = ((x * 2.0).sin() * (y * 2.0).cos() + time * 0.5).sin();

    let value = (v1 + v2 + v3 + v4 + v5 + v6) / 6.0;
    let breath = 0.85 + 0.15 * (time * 0.3).sin();
    ((value * breath + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Shared geometry: `speed` in tenths of wave-time per second, `scale` in
/// pixels per wave unit (`0` behaves as `1`).
fn paint_field(
    t: Timestamp,
    speed: u16,
    scale: u16,
    frame: &mut PixelBuffer,
    color: impl Fn(f64) -> Rgb,
) {
    let time = t as f64 / 1_000_000.0 * f64::from(speed) / 10.0;
    let scale = f64::from(scale.max(1));
    frame.paint_with(|x, y| color(field(x as f64 / scale, y as f64 / scale, time)));
}

/// Plasma mapped onto the hue circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Plasma {
    pub speed: u16,
    pub scale: u16,
    pub saturation: u8,
    pub value: u8,
}

impl Default for Plasma {
    fn default() -> Self {
        Self {
            speed: 7,
            scale: 20,
            saturation: 255,
            value: 255,
        }
    }
}

impl AnimationGenerator for Plasma {
    fn name(&self) -> &'static str {
        "plasma"
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("speed", ParamSpec::range(0, 100, self.speed.into())),
            ("scale", ParamSpec::range(1, 200, self.scale.into())),
            ("saturation", ParamSpec::range(0, 255, self.saturation.into())),
            ("value", ParamSpec::range(0, 255, self.value.into())),
        ]
    }

    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer) {
        let (s, v) = (self.saturation, self.value);
        let max_hue = fx(360) - 1;
        paint_field(t, self.speed, self.scale, frame, |w| {
            let hue = ((w * 360.0) * f64::from(1u32 << FRAC_BITS)) as i32;
            Hsv::from_u8(hue.clamp(0, max_hue), s, v).to_rgb()
        });
    }
}

/// Plasma blended between two colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Plasma2 {
    pub speed: u16,
    pub scale: u16,
    pub color_a: Rgb,
    pub color_b: Rgb,
}

impl Default for Plasma2 {
    fn default() -> Self {
        Self {
            speed: 7,
            scale: 20,
            color_a: Rgb::WHITE,
            color_b: Rgb::BLACK,
        }
    }
}

impl AnimationGenerator for Plasma2 {
    fn name(&self) -> &'static str {
        "plasma_2"
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("speed", ParamSpec::range(0, 100, self.speed.into())),
            ("scale", ParamSpec::range(1, 200, self.scale.into())),
            ("color_a", ParamSpec::color(self.color_a)),
            ("color_b", ParamSpec::color(self.color_b)),
        ]
    }

    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer) {
        let (a, b) = (self.color_a, self.color_b);
        paint_field(t, self.speed, self.scale, frame, |w| a.lerp(b, w));
    }
}
