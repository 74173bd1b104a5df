#![forbid(unsafe_code)]

//! Display protocol: metadata load, text, brightness and pixel pushes.

use std::fmt;

use cheetah_core::{CharacterBuffer, DisplayInfo, InfoError, PixelBuffer, encode};
use serde_json::{Value, json};

use crate::transport::{Transport, TransportError};

pub const DISPLAY_INFO_PATH: &str = "/info/display.json";
pub const DEVICE_INFO_PATH: &str = "/info/device.json";
pub const BUFFER_PATH: &str = "/canvas/buffer.json";
pub const BRIGHTNESS_PATH: &str = "/canvas/brightness.json";
pub const DEFAULT_PIXELS_PATH: &str = "/canvas/pixels.json";

/// Device protocol errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device could not be reached or refused the request.
    Unreachable(TransportError),
    /// A metadata document is missing required fields or is not JSON.
    MalformedInfo { path: String, reason: String },
    /// Brightness outside `0..=255`; nothing was sent.
    InvalidBrightness(i64),
}

impl DeviceError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(err) => write!(f, "device unreachable: {err}"),
            Self::MalformedInfo { path, reason } => {
                write!(f, "malformed device metadata at {path}: {reason}")
            }
            Self::InvalidBrightness(value) => {
                write!(f, "brightness {value} is outside 0..=255")
            }
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreachable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for DeviceError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Body { path, reason } => Self::MalformedInfo { path, reason },
            other => Self::Unreachable(other),
        }
    }
}

fn malformed(path: &str, err: &InfoError) -> DeviceError {
    DeviceError::MalformedInfo {
        path: path.to_owned(),
        reason: err.to_string(),
    }
}

/// Fetch and validate `display.json`.
pub fn load_display_info<T: Transport>(transport: &T) -> Result<DisplayInfo, DeviceError> {
    let display = transport.get_json(DISPLAY_INFO_PATH)?;
    DisplayInfo::from_json(&display).map_err(|e| malformed(DISPLAY_INFO_PATH, &e))
}

/// A connected display.
///
/// Metadata is loaded once in [`DisplayClient::connect`] and never
/// refreshed. Pushes carry no state between calls, so one client may be
/// used for text and pixels at the same time.
#[derive(Debug)]
pub struct DisplayClient<T> {
    transport: T,
    info: DisplayInfo,
    device: Value,
    pixels_path: String,
}

impl<T: Transport> DisplayClient<T> {
    /// Load display and device metadata. Any failure is final; there is no
    /// fallback display description.
    pub fn connect(transport: T) -> Result<Self, DeviceError> {
        let info = load_display_info(&transport)?;
        let device = transport.get_json(DEVICE_INFO_PATH)?;

        tracing::info!(
            charbuf_size = info.charbuf_size,
            width = info.width,
            quirks = ?info.quirks,
            "display metadata loaded"
        );
        Ok(Self {
            transport,
            info,
            device,
            pixels_path: DEFAULT_PIXELS_PATH.to_owned(),
        })
    }

    /// Send pixel frames to `path` instead of [`DEFAULT_PIXELS_PATH`].
    #[must_use]
    pub fn with_pixels_path(mut self, path: impl Into<String>) -> Self {
        self.pixels_path = path.into();
        self
    }

    pub fn info(&self) -> &DisplayInfo {
        &self.info
    }

    /// The device document, as reported.
    pub fn device(&self) -> &Value {
        &self.device
    }

    pub fn pixels_path(&self) -> &str {
        &self.pixels_path
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encode `text` for this display and push it. Returns the buffer sent.
    pub fn set_text(&self, text: &str) -> Result<CharacterBuffer, DeviceError> {
        let buffer = encode(text, &self.info);
        self.transport
            .post_json(BUFFER_PATH, &json!({ "buffer": buffer.to_base64() }))?;
        tracing::debug!(text, len = buffer.len(), "text pushed");
        Ok(buffer)
    }

    /// Set the brightness. Values outside `0..=255` are rejected before
    /// anything is sent.
    pub fn set_brightness(&self, value: i64) -> Result<(), DeviceError> {
        if !(0..=255).contains(&value) {
            return Err(DeviceError::InvalidBrightness(value));
        }
        self.transport
            .post_json(BRIGHTNESS_PATH, &json!({ "brightness": value }))?;
        tracing::debug!(value, "brightness set");
        Ok(())
    }

    /// Push one pixel frame.
    pub fn send_pixels(&self, frame: &PixelBuffer) -> Result<(), DeviceError> {
        self.transport
            .post_json(&self.pixels_path, &json!({ "buffer": frame.to_base64() }))?;
        tracing::trace!(
            width = frame.width(),
            height = frame.height(),
            "pixels pushed"
        );
        Ok(())
    }
}
