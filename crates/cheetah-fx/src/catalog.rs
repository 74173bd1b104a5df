#![forbid(unsafe_code)]

//! Generator catalog: every generator with its parameter schema.
//!
//! The catalog serializes to the document configuration UIs read:
//!
//! ```json
//! {"generators": [
//!   {"name": "solid_single",
//!    "params": {"color": {"type": "color", "value": {"r": 255, "g": 0, "b": 0}}}},
//!   {"name": "rainbow_t",
//!    "params": {"period": {"type": "range", "min": 0, "max": 600000000, "value": 10000000}}}
//! ]}
//! ```
//!
//! Ranges are the suggested UI bounds; deserialization accepts any value
//! the parameter's integer type can hold.

use std::collections::BTreeMap;

use cheetah_core::Rgb;
use serde::Serialize;

use crate::{AnimationGenerator, Generator};

/// Schema of one generator parameter, carrying its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamSpec {
    Color { value: Rgb },
    Palette { value: Vec<Rgb> },
    Range { min: i64, max: i64, value: i64 },
}

impl ParamSpec {
    pub fn color(value: Rgb) -> Self {
        Self::Color { value }
    }

    pub fn palette(colors: &[Rgb]) -> Self {
        Self::Palette {
            value: colors.to_vec(),
        }
    }

    pub fn range(min: i64, max: i64, value: i64) -> Self {
        Self::Range { min, max, value }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorSpec {
    pub name: &'static str,
    pub params: BTreeMap<&'static str, ParamSpec>,
}

impl GeneratorSpec {
    /// Describe `generator` with its current parameter values.
    pub fn describe(generator: &dyn AnimationGenerator) -> Self {
        Self {
            name: generator.name(),
            params: generator.params().into_iter().collect(),
        }
    }
}

/// All generators with their default parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub generators: Vec<GeneratorSpec>,
}

impl Catalog {
    /// The catalog as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self)
    }

    pub fn get(&self, name: &str) -> Option<&GeneratorSpec> {
        self.generators.iter().find(|spec| spec.name == name)
    }
}

/// Build the catalog from every generator's defaults.
pub fn catalog() -> Catalog {
    let generators = Generator::defaults()
        .iter()
        .map(|generator| GeneratorSpec::describe(generator))
        .collect();
    Catalog { generators }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lists_every_generator_once() {
        let cat = catalog();
        let names: Vec<_> = cat.generators.iter().map(|g| g.name).collect();
        assert_eq!(names, Generator::NAMES);
    }

    #[test]
    fn param_spec_shapes() {
        let v = serde_json::to_value(ParamSpec::range(0, 10, 3)).unwrap();
        assert_eq!(v, json!({"type": "range", "min": 0, "max": 10, "value": 3}));
        let v = serde_json::to_value(ParamSpec::color(Rgb::new(1, 2, 3))).unwrap();
        assert_eq!(v, json!({"type": "color", "value": {"r": 1, "g": 2, "b": 3}}));
    }

    #[test]
    fn json_document_shape() {
        let doc = catalog().to_json();
        let solid = &doc["generators"][0];
        assert_eq!(solid["name"], "solid_single");
        assert_eq!(solid["params"]["color"]["type"], "color");
        let blink = catalog();
        let blink = blink.get("on_off_100_frames").unwrap();
        assert!(blink.params.is_empty());
    }

    #[test]
    fn defaults_round_trip_through_selection() {
        for name in Generator::NAMES {
            let generator = Generator::from_name(name).unwrap();
            let doc = serde_json::to_value(&generator).unwrap();
            let back: Generator = serde_json::from_value(doc).unwrap();
            assert_eq!(back, generator, "{name}");
        }
    }
}
