#![forbid(unsafe_code)]

//! Three-color scrolling gradients and the shared gradient axis.
//!
//! Both gradients project every pixel onto an axis at `angle` degrees,
//! normalize by the frame diagonal, and scroll along that axis at `speed`.
//! The three colors sit at equal distances along one period of the axis:
//! `hard_gradient_3` switches between them in steps, `soft_gradient_3`
//! blends each into the next.

use cheetah_core::fixed_point::{
    FRAC_BITS, FX_ONE, Fx, cos, degrees_to_angle, fx, micros_to_seconds_fx, sin, sqrt, unfx,
    unfx_round,
};
use cheetah_core::{PixelBuffer, Rgb, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{AnimationGenerator, ParamSpec};

/// Projection of pixel coordinates onto a scaled gradient axis.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Axis {
    cos: i64,
    sin: i64,
    diagonal: i64,
    scale: i64,
}

impl Axis {
    pub(crate) fn new(angle: u16, scale: u16, width: usize, height: usize) -> Self {
        let units = degrees_to_angle(angle);
        let squared = width.saturating_mul(width).saturating_add(height.saturating_mul(height));
        let diagonal = sqrt(u32::try_from(squared).unwrap_or(u32::MAX));
        Self {
            cos: i64::from(cos(units)),
            sin: i64::from(sin(units)),
            diagonal: i64::from(diagonal).max(1),
            scale: i64::from(fx(i32::from(scale))) / 100,
        }
    }

    /// Scale as fixed point (`100` percent is `1.0`).
    #[inline]
    pub(crate) fn scale(&self) -> i64 {
        self.scale
    }

    /// Position of `(x, y)` along `span` units of the axis, advanced by
    /// `rate_fx` units per second, wrapped into `[0, span)`.
    pub(crate) fn phase(&self, x: usize, y: usize, rate_fx: i64, t_sec_fx: i64, span: i64) -> Fx {
        let distance = x as i64 * self.cos + y as i64 * self.sin;
        let normalized = (distance << FRAC_BITS) / self.diagonal;
        let offset = ((normalized + i64::from(FX_ONE)) * span * self.scale) >> FRAC_BITS;
        let motion = (i128::from(rate_fx) * i128::from(t_sec_fx)) >> FRAC_BITS;
        (motion + i128::from(offset)).rem_euclid(i128::from(span) << FRAC_BITS) as Fx
    }
}

/// Shared parameters of the three-color gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Gradient3 {
    /// Scroll speed, in hundredths of a period per second at 100% scale.
    pub speed: u16,
    /// Axis direction in degrees.
    pub angle: u16,
    /// Axis scale in percent.
    pub scale: u16,
    pub colors: [Rgb; 3],
}

impl Default for Gradient3 {
    fn default() -> Self {
        Self {
            speed: 25,
            angle: 97,
            scale: 100,
            colors: [
                Rgb::new(255, 0, 128),
                Rgb::new(0, 255, 0),
                Rgb::new(0, 255, 255),
            ],
        }
    }
}

impl Gradient3 {
    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("speed", ParamSpec::range(0, 1000, self.speed.into())),
            ("angle", ParamSpec::range(0, 359, self.angle.into())),
            ("scale", ParamSpec::range(1, 1000, self.scale.into())),
            ("colors", ParamSpec::palette(&self.colors)),
        ]
    }

    /// Paint with `pick` mapping a phase in `[0, 1)` to a color.
    fn paint(&self, t: Timestamp, frame: &mut PixelBuffer, pick: impl Fn(Fx) -> Rgb) {
        let axis = Axis::new(self.angle, self.scale, frame.width(), frame.height());
        let rate = i64::from(self.speed) * axis.scale() / 100;
        let t_sec = micros_to_seconds_fx(t);
        frame.paint_with(|x, y| pick(axis.phase(x, y, rate, t_sec, 1)));
    }
}

/// Step gradient: each pixel takes the nearest of three colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardGradient3(pub Gradient3);

impl AnimationGenerator for HardGradient3 {
    fn name(&self) -> &'static str {
        "hard_gradient_3"
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        self.0.params()
    }

    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer) {
        let colors = self.0.colors;
        self.0.paint(t, frame, |phase| {
            let segment = unfx_round(phase * 3).rem_euclid(3) as usize;
            colors[segment]
        });
    }
}

/// Continuous gradient: linear blend between neighboring colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoftGradient3(pub Gradient3);

impl AnimationGenerator for SoftGradient3 {
    fn name(&self) -> &'static str {
        "soft_gradient_3"
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        self.0.params()
    }

    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer) {
        let colors = self.0.colors;
        self.0.paint(t, frame, |phase| {
            let position = phase * 3;
            let index = unfx(position).rem_euclid(3) as usize;
            let weight = position - fx(unfx(position));
            colors[index].lerp_fx(colors[(index + 1) % 3], weight)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const GREEN: Rgb = Rgb::new(0, 255, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn params(speed: u16, angle: u16) -> Gradient3 {
        Gradient3 {
            speed,
            angle,
            scale: 100,
            colors: [RED, GREEN, BLUE],
        }
    }

    #[test]
    fn axis_phase_stays_in_span() {
        let axis = Axis::new(45, 250, 30, 20);
        for y in 0..20 {
            for x in 0..30 {
                let p = axis.phase(x, y, 12_345, 1 << 40, 360);
                assert!((0..fx(360)).contains(&p), "x={x} y={y} p={p}");
            }
        }
    }

    #[test]
    fn axis_measures_wide_frame_diagonal() {
        // 50000^2 + 20000^2 = 2.9e9, above 2^31.
        let axis = Axis::new(0, 100, 50_000, 20_000);
        assert_eq!(axis.diagonal >> FRAC_BITS, 53_851);
    }

    #[test]
    fn origin_phase_at_rest_is_scale() {
        // At (0, 0) the normalized distance is zero, so the offset is one
        // full period times the scale: 1.0 * 100% wraps to 0.
        let axis = Axis::new(0, 100, 10, 10);
        assert_eq!(axis.phase(0, 0, 0, 0, 1), 0);
        let axis = Axis::new(0, 50, 10, 10);
        assert_eq!(axis.phase(0, 0, 0, 0, 1), FX_ONE / 2);
    }

    #[test]
    fn hard_gradient_only_uses_its_colors() {
        let mut frame = PixelBuffer::new(16, 12);
        HardGradient3(params(25, 30)).generate(1_700_000_000_000_000, &mut frame);
        for y in 0..12 {
            for x in 0..16 {
                let c = frame.pixel(x, y).unwrap();
                assert!([RED, GREEN, BLUE].contains(&c), "unexpected {c:?}");
            }
        }
    }

    #[test]
    fn hard_gradient_uses_more_than_one_color_across_frame() {
        let mut frame = PixelBuffer::new(40, 40);
        HardGradient3(params(0, 45)).generate(0, &mut frame);
        assert_eq!(frame.pixel(0, 0), Some(RED));
        assert_eq!(frame.pixel(12, 12), Some(GREEN));
        assert_eq!(frame.pixel(24, 24), Some(BLUE));
    }

    #[test]
    fn zero_speed_is_static() {
        let gen_ = SoftGradient3(params(0, 97));
        let mut a = PixelBuffer::new(8, 8);
        let mut b = PixelBuffer::new(8, 8);
        gen_.generate(0, &mut a);
        gen_.generate(3_600_000_000, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn soft_gradient_blends_between_stops() {
        let mut frame = PixelBuffer::new(40, 1);
        SoftGradient3(params(0, 0)).generate(0, &mut frame);
        let any_mixed = (0..40).any(|x| {
            let c = frame.pixel(x, 0).unwrap();
            ![RED, GREEN, BLUE].contains(&c)
        });
        assert!(any_mixed);
    }

    #[test]
    fn gradients_move_with_time() {
        let gen_ = HardGradient3(params(100, 0));
        let mut a = PixelBuffer::new(20, 1);
        let mut b = PixelBuffer::new(20, 1);
        gen_.generate(0, &mut a);
        // One third of a period later at speed 100 (one period per second).
        gen_.generate(333_334, &mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let g: HardGradient3 = serde_json::from_str(r#"{"speed": 3}"#).unwrap();
        assert_eq!(g.0.speed, 3);
        assert_eq!(g.0.angle, Gradient3::default().angle);
    }
}
