#![forbid(unsafe_code)]

//! Countdown to a wall-clock target.
//!
//! [`Countdown::poll`] is called as often as the caller likes and answers
//! with at most one new text per elapsed wall-clock second. Once the target
//! is reached it answers [`Tick::Finished`] exactly once and then stays
//! [`Tick::Idle`].
//!
//! Format strings use brace fields in the style of
//! `"{d}d {H:02d}:{M:02d}:{S:02d}"`:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `{d}` | whole days |
//! | `{H}` | hours, `0..24` |
//! | `{M}` | minutes, `0..60` |
//! | `{S}` | seconds, `0..60` |
//!
//! A field may carry a width, `{S:2d}`, and a zero-pad flag, `{S:02d}`.
//! `{{` and `}}` are literal braces.

use std::fmt;
use std::fmt::Write as _;

use chrono::NaiveDateTime;

/// Default countdown format.
pub const DEFAULT_FORMAT: &str = "{d}d {H:02d}:{M:02d}:{S:02d}";

/// Accepted target syntax, e.g. `2026-12-31 23:59:59`.
pub const TARGET_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a countdown target in [`TARGET_FORMAT`].
pub fn parse_target(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(input.trim(), TARGET_FORMAT)
}

/// A format string that does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// `{` without a matching `}`.
    Unclosed { position: usize },
    /// `}` outside a field and not doubled.
    StrayBrace { position: usize },
    /// Field name other than `d`, `H`, `M`, `S`.
    UnknownField { position: usize, name: String },
    /// Field spec other than `[0][width][d]`.
    BadSpec { position: usize, spec: String },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unclosed { position } => write!(f, "unclosed '{{' at byte {position}"),
            Self::StrayBrace { position } => write!(f, "single '}}' at byte {position}"),
            Self::UnknownField { position, name } => {
                write!(f, "unknown field {name:?} at byte {position} (expected d, H, M or S)")
            }
            Self::BadSpec { position, spec } => {
                write!(f, "invalid field spec {spec:?} at byte {position}")
            }
        }
    }
}

impl std::error::Error for FormatError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Unit {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "d" => Some(Self::Days),
            "H" => Some(Self::Hours),
            "M" => Some(Self::Minutes),
            "S" => Some(Self::Seconds),
            _ => None,
        }
    }

    fn of(self, total: u64) -> u64 {
        match self {
            Self::Days => total / 86_400,
            Self::Hours => total % 86_400 / 3_600,
            Self::Minutes => total % 3_600 / 60,
            Self::Seconds => total % 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field {
        unit: Unit,
        width: usize,
        zero_pad: bool,
    },
}

/// A parsed countdown format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownFormat {
    pieces: Vec<Piece>,
}

impl Default for CountdownFormat {
    fn default() -> Self {
        Self {
            pieces: vec![
                field(Unit::Days, 0, false),
                Piece::Literal("d ".into()),
                field(Unit::Hours, 2, true),
                Piece::Literal(":".into()),
                field(Unit::Minutes, 2, true),
                Piece::Literal(":".into()),
                field(Unit::Seconds, 2, true),
            ],
        }
    }
}

fn field(unit: Unit, width: usize, zero_pad: bool) -> Piece {
    Piece::Field {
        unit,
        width,
        zero_pad,
    }
}

fn parse_spec(spec: &str) -> Option<(usize, bool)> {
    let spec = spec.strip_suffix('d').unwrap_or(spec);
    let (zero_pad, digits) = match spec.strip_prefix('0') {
        Some(rest) => (true, rest),
        None => (false, spec),
    };
    if digits.is_empty() {
        return Some((0, zero_pad));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|width| (width, zero_pad))
}

impl CountdownFormat {
    pub fn parse(format: &str) -> Result<Self, FormatError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = format.char_indices().peekable();

        while let Some((position, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().is_some_and(|&(_, c)| c == '{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().is_some_and(|&(_, c)| c == '}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(FormatError::StrayBrace { position }),
                '{' => {
                    let start = position + 1;
                    let end = format[start..]
                        .find('}')
                        .map(|offset| start + offset)
                        .ok_or(FormatError::Unclosed { position })?;
                    let body = &format[start..end];
                    let (name, spec) = body.split_once(':').unwrap_or((body, ""));
                    let unit = Unit::from_name(name).ok_or_else(|| FormatError::UnknownField {
                        position,
                        name: name.to_owned(),
                    })?;
                    let (width, zero_pad) =
                        parse_spec(spec).ok_or_else(|| FormatError::BadSpec {
                            position,
                            spec: spec.to_owned(),
                        })?;

                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(field(unit, width, zero_pad));
                    while chars.peek().is_some_and(|&(i, _)| i <= end) {
                        chars.next();
                    }
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self { pieces })
    }

    /// Render `remaining` whole seconds.
    pub fn render(&self, remaining: u64) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Field {
                    unit,
                    width,
                    zero_pad: true,
                } => {
                    let _ = write!(out, "{:0width$}", unit.of(remaining), width = *width);
                }
                Piece::Field {
                    unit,
                    width,
                    zero_pad: false,
                } => {
                    let _ = write!(out, "{:width$}", unit.of(remaining), width = *width);
                }
            }
        }
        out
    }
}

/// Result of one [`Countdown::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Nothing new since the last text.
    Idle,
    /// New countdown text for this second.
    Show(String),
    /// Target reached; show the final text and stop polling.
    Finished(String),
}

/// Countdown state.
#[derive(Debug, Clone)]
pub struct Countdown {
    target: NaiveDateTime,
    format: CountdownFormat,
    final_text: String,
    last_second: Option<i64>,
    finished: bool,
}

impl Countdown {
    pub fn new(target: NaiveDateTime, format: CountdownFormat, final_text: impl Into<String>) -> Self {
        Self {
            target,
            format,
            final_text: final_text.into(),
            last_second: None,
            finished: false,
        }
    }

    pub fn target(&self) -> NaiveDateTime {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Seconds left at `now`, rounded to the nearest second; 0 once past.
    pub fn remaining(&self, now: NaiveDateTime) -> u64 {
        let millis = (self.target - now).num_milliseconds().max(0);
        ((millis + 500) / 1_000) as u64
    }

    pub fn poll(&mut self, now: NaiveDateTime) -> Tick {
        if self.finished {
            return Tick::Idle;
        }
        if now >= self.target {
            self.finished = true;
            return Tick::Finished(self.final_text.clone());
        }

        let second = now.and_utc().timestamp();
        if self.last_second == Some(second) {
            return Tick::Idle;
        }
        self.last_second = Some(second);
        Tick::Show(self.format.render(self.remaining(now)))
    }
}
