#![forbid(unsafe_code)]

//! Client for the display's JSON canvas API.
//!
//! # Endpoints
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | GET  | `/info/display.json`      | `{charbuf_size, width, quirks}` |
//! | GET  | `/info/device.json`       | opaque |
//! | POST | `/canvas/buffer.json`     | `{"buffer": base64}` |
//! | POST | `/canvas/brightness.json` | `{"brightness": 0..=255}` |
//! | POST | `/canvas/pixels.json`     | `{"buffer": base64}` (path configurable) |

pub mod client;
pub mod transport;

pub use client::{
    BRIGHTNESS_PATH, BUFFER_PATH, DEFAULT_PIXELS_PATH, DEVICE_INFO_PATH, DISPLAY_INFO_PATH,
    DeviceError, DisplayClient, load_display_info,
};
pub use transport::{HttpTransport, MemoryTransport, Transport, TransportError, base_url};
