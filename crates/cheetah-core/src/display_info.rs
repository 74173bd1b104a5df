#![forbid(unsafe_code)]

//! Device capability metadata.
//!
//! A display reports its capabilities once, at startup, as a JSON document:
//!
//! ```json
//! {"charbuf_size": 48, "width": 24, "quirks": ["combining_full_stop"]}
//! ```
//!
//! [`DisplayInfo::from_json`] lets serde check the document's shape, then
//! applies the range and quirk checks itself. The resulting value is
//! immutable; nothing in the crate mutates it after load.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Rendering deviations known to change how characters are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quirk {
    /// A `.` following another character shares that character's cell,
    /// unless the previous character was itself a `.`.
    CombiningFullStop,
}

impl Quirk {
    /// Wire name of the quirk as reported by the device.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CombiningFullStop => "combining_full_stop",
        }
    }
}

impl fmt::Display for Quirk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoError {
    /// The document is not a JSON object.
    NotAnObject,
    /// A required field is absent.
    MissingField(&'static str),
    /// A field has a JSON type serde could not accept.
    Malformed(String),
    /// A field is present but has the wrong type or range.
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for InfoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "display info is not a JSON object"),
            Self::MissingField(field) => write!(f, "display info is missing `{field}`"),
            Self::Malformed(reason) => write!(f, "display info is malformed: {reason}"),
            Self::InvalidField { field, reason } => {
                write!(f, "display info field `{field}` is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for InfoError {}

/// Capabilities of a text-capable display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayInfo {
    /// Number of entries in the device's character buffer.
    pub charbuf_size: usize,
    /// Number of character cells per display line.
    pub width: usize,
    /// Named rendering quirks, kept verbatim (unknown names included).
    pub quirks: BTreeSet<String>,
}

impl DisplayInfo {
    /// Create display info without quirks.
    pub fn new(charbuf_size: usize, width: usize) -> Self {
        Self {
            charbuf_size,
            width,
            quirks: BTreeSet::new(),
        }
    }

    /// Builder: add a known quirk.
    #[must_use]
    pub fn with_quirk(mut self, quirk: Quirk) -> Self {
        self.quirks.insert(quirk.as_str().to_owned());
        self
    }

    /// Whether the device reports `quirk`.
    #[inline]
    pub fn has_quirk(&self, quirk: Quirk) -> bool {
        self.quirks.contains(quirk.as_str())
    }

    /// Validate a `display.json` document.
    ///
    /// `charbuf_size` and `width` must be non-negative integers; `quirks`
    /// must be an array of strings. Extra fields are ignored.
    pub fn from_json(value: &Value) -> Result<Self, InfoError> {
        if !value.is_object() {
            return Err(InfoError::NotAnObject);
        }
        let raw = RawInfo::deserialize(value).map_err(|e| InfoError::Malformed(e.to_string()))?;

        let charbuf_size = uint_field("charbuf_size", raw.charbuf_size)?;
        let width = uint_field("width", raw.width)?;

        let items = raw.quirks.ok_or(InfoError::MissingField("quirks"))?;
        let mut quirks = BTreeSet::new();
        for item in items {
            match item {
                Value::String(name) => {
                    quirks.insert(name);
                }
                other => {
                    return Err(InfoError::InvalidField {
                        field: "quirks",
                        reason: format!("expected a string entry, got {other}"),
                    });
                }
            }
        }

        Ok(Self {
            charbuf_size,
            width,
            quirks,
        })
    }
}

/// Wire shape of `display.json`. Fields stay optional so a missing one
/// maps to [`InfoError::MissingField`] rather than a serde message.
#[derive(Deserialize)]
struct RawInfo {
    #[serde(default)]
    charbuf_size: Option<Number>,
    #[serde(default)]
    width: Option<Number>,
    #[serde(default)]
    quirks: Option<Vec<Value>>,
}

fn uint_field(field: &'static str, value: Option<Number>) -> Result<usize, InfoError> {
    let value = value.ok_or(InfoError::MissingField(field))?;
    let n = value.as_u64().ok_or_else(|| InfoError::InvalidField {
        field,
        reason: format!("expected a non-negative integer, got {value}"),
    })?;
    usize::try_from(n).map_err(|_| InfoError::InvalidField {
        field,
        reason: format!("{n} does not fit in usize"),
    })
}
