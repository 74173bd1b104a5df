#![forbid(unsafe_code)]

//! Falling trails ("digital rain").
//!
//! Every column carries one trail that falls at `speed` rows per second and
//! wraps around after leaving the bottom edge. The head is drawn in the
//! foreground color and the tail fades linearly into the background. Each
//! column's starting offset, trail length and speed factor are derived from
//! a hash of the column index, so the pattern is a pure function of `t`.

use cheetah_core::fixed_point::{FRAC_BITS, FX_ONE, Fx, micros_to_seconds_fx};
use cheetah_core::{PixelBuffer, Rgb, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{AnimationGenerator, ParamSpec};

/// Falling trail parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Matrix {
    /// Base fall speed in rows per second.
    pub speed: u16,
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            speed: 10,
            foreground: Rgb::new(0, 255, 0),
            background: Rgb::BLACK,
        }
    }
}

/// SplitMix64 finalizer.
#[inline]
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Per-column trail layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Column {
    /// Rows from head to end of tail, head included.
    length: i64,
    /// Rows the head has already fallen at `t = 0`.
    offset: i64,
    /// Speed multiplier in quarters (4 = base speed).
    quarters: i64,
}

impl Column {
    fn new(x: usize, height: usize) -> Self {
        let h = mix(x as u64);
        let height = height as i64;
        let max_extra = (height / 2).max(1) as u64;
        let length = 3 + (h % max_extra) as i64;
        let offset = ((h >> 20) % (height + length).max(1) as u64) as i64;
        let quarters = 3 + ((h >> 40) % 4) as i64;
        Self {
            length,
            offset,
            quarters,
        }
    }

    /// Row of the head at time `t_sec_fx`; may lie below the frame.
    fn head(&self, t_sec_fx: i64, speed: u16, height: usize) -> i64 {
        let rows_fx = i128::from(t_sec_fx) * i128::from(speed) * i128::from(self.quarters) / 4;
        let fallen = (rows_fx >> FRAC_BITS) + i128::from(self.offset);
        fallen.rem_euclid(i128::from(height as i64 + self.length)) as i64
    }

    /// Foreground weight of row `y` given the current head row.
    fn weight(&self, head: i64, y: usize) -> Fx {
        let behind = head - y as i64;
        if (0..self.length).contains(&behind) {
            FX_ONE - (behind * i64::from(FX_ONE) / self.length) as Fx
        } else {
            0
        }
    }
}

impl AnimationGenerator for Matrix {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("speed", ParamSpec::range(0, 200, self.speed.into())),
            ("foreground", ParamSpec::color(self.foreground)),
            ("background", ParamSpec::color(self.background)),
        ]
    }

    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer) {
        let height = frame.height();
        let t_sec = micros_to_seconds_fx(t);
        let heads: Vec<(Column, i64)> = (0..frame.width())
            .map(|x| {
                let column = Column::new(x, height);
                (column, column.head(t_sec, self.speed, height))
            })
            .collect();
        let (bg, fg) = (self.background, self.foreground);
        frame.paint_with(|x, y| {
            let (column, head) = heads[x];
            bg.lerp_fx(fg, column.weight(head, y))
        });
    }
}
