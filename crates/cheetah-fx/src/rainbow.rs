#![forbid(unsafe_code)]

//! Hue rotations: uniform (`rainbow_t`) and spatial (`rainbow_gradient`).

use cheetah_core::fixed_point::{FX_ONE, Fx, fx, micros_to_seconds_fx};
use cheetah_core::{Hsv, PixelBuffer, Timestamp};
use serde::{Deserialize, Serialize};

use crate::gradient::Axis;
use crate::{AnimationGenerator, ParamSpec};

/// Whole frame one color; the hue turns once every `period` time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RainbowT {
    /// Timestamp units per full hue turn. `0` freezes the hue at red.
    pub period: u64,
}

impl Default for RainbowT {
    fn default() -> Self {
        Self { period: 10_000_000 }
    }
}

impl RainbowT {
    /// Hue at `t`, in fixed-point degrees within `[0, 360)`.
    pub fn hue(&self, t: Timestamp) -> Fx {
        if self.period == 0 {
            return 0;
        }
        let period = i128::from(self.period);
        let phase = i128::from(t).rem_euclid(period);
        (phase * i128::from(fx(360)) / period) as Fx
    }
}

impl AnimationGenerator for RainbowT {
    fn name(&self) -> &'static str {
        "rainbow_t"
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![(
            "period",
            ParamSpec::range(0, 600_000_000, self.period.min(i64::MAX as u64) as i64),
        )]
    }

    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer) {
        frame.fill(Hsv::new(self.hue(t), FX_ONE, FX_ONE).to_rgb());
    }
}

/// Hue varies along an axis across the frame and scrolls with time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RainbowGradient {
    /// Degrees of hue per second.
    pub speed: u16,
    /// Axis direction in degrees.
    pub angle: u16,
    /// Percent of the hue circle spanned by the frame diagonal.
    pub scale: u16,
    pub saturation: u8,
    pub value: u8,
}

impl Default for RainbowGradient {
    fn default() -> Self {
        Self {
            speed: 64,
            angle: 0,
            scale: 100,
            saturation: 255,
            value: 255,
        }
    }
}

impl AnimationGenerator for RainbowGradient {
    fn name(&self) -> &'static str {
        "rainbow_gradient"
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("speed", ParamSpec::range(0, 1000, self.speed.into())),
            ("angle", ParamSpec::range(0, 359, self.angle.into())),
            ("scale", ParamSpec::range(1, 1000, self.scale.into())),
            ("saturation", ParamSpec::range(0, 255, self.saturation.into())),
            ("value", ParamSpec::range(0, 255, self.value.into())),
        ]
    }

    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer) {
        let axis = Axis::new(self.angle, self.scale, frame.width(), frame.height());
        let rate = i64::from(self.speed) * axis.scale();
        let t_sec = micros_to_seconds_fx(t);
        let (s, v) = (self.saturation, self.value);
        frame.paint_with(|x, y| Hsv::from_u8(axis.phase(x, y, rate, t_sec, 360), s, v).to_rgb());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cheetah_core::Rgb;

    #[test]
    fn hue_is_linear_in_period() {
        let r = RainbowT { period: 360 };
        assert_eq!(r.hue(0), 0);
        assert_eq!(r.hue(120), fx(120));
        assert_eq!(r.hue(360), 0);
        assert_eq!(r.hue(-120), fx(240));
    }

    #[test]
    fn zero_period_is_frozen_red() {
        let r = RainbowT { period: 0 };
        let mut frame = PixelBuffer::new(3, 3);
        r.generate(123_456, &mut frame);
        assert_eq!(frame.pixel(1, 1), Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn rainbow_t_is_uniform() {
        let mut frame = PixelBuffer::new(5, 4);
        RainbowT { period: 1000 }.generate(250, &mut frame);
        let first = frame.pixel(0, 0).unwrap();
        assert_eq!(first, Rgb::new(128, 255, 0));
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(frame.pixel(x, y), Some(first));
            }
        }
    }

    #[test]
    fn gradient_varies_by_position() {
        let mut frame = PixelBuffer::new(30, 2);
        RainbowGradient::default().generate(0, &mut frame);
        assert_ne!(frame.pixel(0, 0), frame.pixel(15, 0));
        // Angle 0: columns vary, rows do not.
        assert_eq!(frame.pixel(7, 0), frame.pixel(7, 1));
    }

    #[test]
    fn gradient_scrolls_with_time() {
        let gen_ = RainbowGradient::default();
        let mut a = PixelBuffer::new(10, 10);
        let mut b = PixelBuffer::new(10, 10);
        gen_.generate(0, &mut a);
        gen_.generate(1_000_000, &mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn zero_value_is_black() {
        let gen_ = RainbowGradient {
            value: 0,
            ..RainbowGradient::default()
        };
        let mut frame = PixelBuffer::new(4, 4);
        gen_.generate(42, &mut frame);
        assert!(frame.as_bytes().iter().all(|&b| b == 0));
    }
}
