#![forbid(unsafe_code)]

//! Constant-color fills: `solid_single` and `on_off_100_frames`.

use cheetah_core::{PixelBuffer, Rgb, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{AnimationGenerator, ParamSpec};

/// Every pixel set to one color, whatever `t` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolidSingle {
    pub color: Rgb,
}

impl Default for SolidSingle {
    fn default() -> Self {
        Self {
            color: Rgb::new(255, 0, 0),
        }
    }
}

impl AnimationGenerator for SolidSingle {
    fn name(&self) -> &'static str {
        "solid_single"
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![("color", ParamSpec::color(self.color))]
    }

    fn generate(&self, _t: Timestamp, frame: &mut PixelBuffer) {
        frame.fill(self.color);
    }
}

/// Frames in one on/off cycle.
pub const BLINK_PERIOD: i64 = 100;

/// Binary blink: white for the first half of every 100-frame cycle, black
/// for the second. `t` is read as a frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnOff100Frames {}

impl OnOff100Frames {
    /// Whether frame `t` is in the lit half of its cycle.
    #[inline]
    pub fn is_on(t: Timestamp) -> bool {
        t.rem_euclid(BLINK_PERIOD) < BLINK_PERIOD / 2
    }
}

impl AnimationGenerator for OnOff100Frames {
    fn name(&self) -> &'static str {
        "on_off_100_frames"
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        Vec::new()
    }

    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer) {
        frame.fill(if Self::is_on(t) { Rgb::WHITE } else { Rgb::BLACK });
    }
}
