#![forbid(unsafe_code)]

//! Frame consumers.

use std::fmt;

use cheetah_core::PixelBuffer;

/// How bad a delivery failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkErrorKind {
    /// The frame was lost; the next one may get through.
    Transient,
    /// The consumer is gone; stop producing frames.
    Fatal,
}

/// A failed frame delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    pub kind: SinkErrorKind,
    pub message: String,
}

impl SinkError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: SinkErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: SinkErrorKind::Fatal,
            message: message.into(),
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind == SinkErrorKind::Fatal
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SinkErrorKind::Transient => write!(f, "frame delivery failed: {}", self.message),
            SinkErrorKind::Fatal => write!(f, "frame consumer failed: {}", self.message),
        }
    }
}

impl std::error::Error for SinkError {}

/// Consumer of finished frames: a network transmitter, a preview, a
/// handoff to another thread.
///
/// `deliver` only ever sees complete frames and must not keep the borrow.
pub trait FrameSink {
    fn deliver(&mut self, frame: &PixelBuffer) -> Result<(), SinkError>;
}

impl<F> FrameSink for F
where
    F: FnMut(&PixelBuffer) -> Result<(), SinkError>,
{
    fn deliver(&mut self, frame: &PixelBuffer) -> Result<(), SinkError> {
        self(frame)
    }
}

/// Discards every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn deliver(&mut self, _frame: &PixelBuffer) -> Result<(), SinkError> {
        Ok(())
    }
}
