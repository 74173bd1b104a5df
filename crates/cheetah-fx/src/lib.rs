#![forbid(unsafe_code)]

//! Procedural animation generators.
//!
//! Every generator is a pure function of a timestamp, its parameters and
//! the frame size: it overwrites every byte of the [`PixelBuffer`] it is
//! handed and keeps no state between frames.
//!
//! # Key Types
//!
//! - [`AnimationGenerator`] - the rendering seam
//! - [`Generator`] - one variant per pattern, selectable by name or JSON
//! - [`Catalog`] - every generator with its parameter schema
//!
//! # Selection documents
//!
//! A [`Generator`] deserializes from `{"generator": "<name>", "params": {..}}`.
//! `params` may be omitted or partial; missing fields take the defaults
//! shown by [`catalog()`]. Colors are `{"r", "g", "b"}` objects.

pub mod catalog;
pub mod gradient;
pub mod matrix;
pub mod plasma;
pub mod rainbow;
pub mod solid;

use std::fmt;

use cheetah_core::{PixelBuffer, Timestamp};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use catalog::{Catalog, GeneratorSpec, ParamSpec, catalog};
pub use gradient::{Gradient3, HardGradient3, SoftGradient3};
pub use matrix::Matrix;
pub use plasma::{Plasma, Plasma2};
pub use rainbow::{RainbowGradient, RainbowT};
pub use solid::{OnOff100Frames, SolidSingle};

/// A procedural pattern that paints whole frames.
///
/// Implementations must:
/// - write every byte of `frame`;
/// - produce identical bytes for identical `(t, self, frame size)`;
/// - tolerate zero-sized frames.
pub trait AnimationGenerator {
    /// Wire name, as used in selection documents and the catalog.
    fn name(&self) -> &'static str;

    /// Parameter schema with current values.
    fn params(&self) -> Vec<(&'static str, ParamSpec)>;

    /// Paint the frame for time `t`.
    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer);
}

/// Errors selecting a generator by name or JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No generator has this name.
    UnknownGenerator(String),
    /// The `params` object does not fit the generator.
    InvalidParams {
        generator: &'static str,
        reason: String,
    },
    /// The selection document is not valid JSON of the expected shape.
    Malformed(String),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGenerator(name) => write!(f, "unknown generator `{name}`"),
            Self::InvalidParams { generator, reason } => {
                write!(f, "invalid params for `{generator}`: {reason}")
            }
            Self::Malformed(reason) => write!(f, "malformed generator selection: {reason}"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// The active pattern of a frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "generator", content = "params")]
pub enum Generator {
    #[serde(rename = "solid_single")]
    SolidSingle(SolidSingle),
    #[serde(rename = "rainbow_t")]
    RainbowT(RainbowT),
    #[serde(rename = "rainbow_gradient")]
    RainbowGradient(RainbowGradient),
    #[serde(rename = "hard_gradient_3")]
    HardGradient3(HardGradient3),
    #[serde(rename = "soft_gradient_3")]
    SoftGradient3(SoftGradient3),
    #[serde(rename = "on_off_100_frames")]
    OnOff100Frames(OnOff100Frames),
    #[serde(rename = "matrix")]
    Matrix(Matrix),
    #[serde(rename = "plasma")]
    Plasma(Plasma),
    #[serde(rename = "plasma_2")]
    Plasma2(Plasma2),
}

impl Default for Generator {
    fn default() -> Self {
        Self::RainbowGradient(RainbowGradient::default())
    }
}

impl Generator {
    /// Every generator name, in catalog order.
    pub const NAMES: [&'static str; 9] = [
        "solid_single",
        "rainbow_t",
        "rainbow_gradient",
        "hard_gradient_3",
        "soft_gradient_3",
        "on_off_100_frames",
        "matrix",
        "plasma",
        "plasma_2",
    ];

    /// Every generator with default parameters, in catalog order.
    pub fn defaults() -> [Self; 9] {
        [
            Self::SolidSingle(SolidSingle::default()),
            Self::RainbowT(RainbowT::default()),
            Self::RainbowGradient(RainbowGradient::default()),
            Self::HardGradient3(HardGradient3::default()),
            Self::SoftGradient3(SoftGradient3::default()),
            Self::OnOff100Frames(OnOff100Frames::default()),
            Self::Matrix(Matrix::default()),
            Self::Plasma(Plasma::default()),
            Self::Plasma2(Plasma2::default()),
        ]
    }

    /// The named generator with default parameters.
    pub fn from_name(name: &str) -> Result<Self, SelectionError> {
        Self::from_params(name, None)
    }

    /// The named generator with `params` laid over its defaults.
    pub fn from_params(name: &str, params: Option<Value>) -> Result<Self, SelectionError> {
        let generator = match name {
            "solid_single" => Self::SolidSingle(decode("solid_single", params)?),
            "rainbow_t" => Self::RainbowT(decode("rainbow_t", params)?),
            "rainbow_gradient" => Self::RainbowGradient(decode("rainbow_gradient", params)?),
            "hard_gradient_3" => Self::HardGradient3(decode("hard_gradient_3", params)?),
            "soft_gradient_3" => Self::SoftGradient3(decode("soft_gradient_3", params)?),
            "on_off_100_frames" => Self::OnOff100Frames(decode("on_off_100_frames", params)?),
            "matrix" => Self::Matrix(decode("matrix", params)?),
            "plasma" => Self::Plasma(decode("plasma", params)?),
            "plasma_2" => Self::Plasma2(decode("plasma_2", params)?),
            other => return Err(SelectionError::UnknownGenerator(other.to_owned())),
        };
        tracing::debug!(generator = generator.name(), "generator selected");
        Ok(generator)
    }

    /// Parse a selection: a JSON document when it starts with `{`,
    /// otherwise a bare generator name.
    pub fn parse(input: &str) -> Result<Self, SelectionError> {
        let input = input.trim();
        if input.starts_with('{') {
            let selection: Selection = serde_json::from_str(input)
                .map_err(|err| SelectionError::Malformed(err.to_string()))?;
            Self::from_params(&selection.generator, selection.params)
        } else {
            Self::from_name(input)
        }
    }

    fn inner(&self) -> &dyn AnimationGenerator {
        match self {
            Self::SolidSingle(g) => g,
            Self::RainbowT(g) => g,
            Self::RainbowGradient(g) => g,
            Self::HardGradient3(g) => g,
            Self::SoftGradient3(g) => g,
            Self::OnOff100Frames(g) => g,
            Self::Matrix(g) => g,
            Self::Plasma(g) => g,
            Self::Plasma2(g) => g,
        }
    }
}

impl AnimationGenerator for Generator {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        self.inner().params()
    }

    fn generate(&self, t: Timestamp, frame: &mut PixelBuffer) {
        self.inner().generate(t, frame);
    }
}

#[derive(Deserialize)]
struct Selection {
    generator: String,
    #[serde(default)]
    params: Option<Value>,
}

impl<'de> Deserialize<'de> for Generator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let selection = Selection::deserialize(deserializer)?;
        Self::from_params(&selection.generator, selection.params).map_err(D::Error::custom)
    }
}

fn decode<T: DeserializeOwned + Default>(
    generator: &'static str,
    params: Option<Value>,
) -> Result<T, SelectionError> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|err| SelectionError::InvalidParams {
            generator,
            reason: err.to_string(),
        }),
    }
}
