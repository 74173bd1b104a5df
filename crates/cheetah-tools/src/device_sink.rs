#![forbid(unsafe_code)]

//! [`FrameSink`] pushing frames to a display over its JSON API.

use cheetah_client::{DisplayClient, Transport};
use cheetah_core::PixelBuffer;
use cheetah_runtime::{FrameSink, SinkError};

/// Sends every delivered frame with [`DisplayClient::send_pixels`].
///
/// An unreachable device is a transient failure: the frame is dropped and
/// the loop keeps going. Anything else is fatal.
#[derive(Debug)]
pub struct DeviceSink<T> {
    client: DisplayClient<T>,
    failure_streak: u64,
}

impl<T: Transport> DeviceSink<T> {
    pub fn new(client: DisplayClient<T>) -> Self {
        Self {
            client,
            failure_streak: 0,
        }
    }

    pub fn client(&self) -> &DisplayClient<T> {
        &self.client
    }

    /// Consecutive failed pushes since the last success.
    pub fn failure_streak(&self) -> u64 {
        self.failure_streak
    }
}

impl<T: Transport> FrameSink for DeviceSink<T> {
    fn deliver(&mut self, frame: &PixelBuffer) -> Result<(), SinkError> {
        match self.client.send_pixels(frame) {
            Ok(()) => {
                if self.failure_streak > 0 {
                    tracing::info!(failed = self.failure_streak, "display reachable again");
                    self.failure_streak = 0;
                }
                Ok(())
            }
            Err(err) if err.is_transient() => {
                self.failure_streak += 1;
                Err(SinkError::transient(err.to_string()))
            }
            Err(err) => Err(SinkError::fatal(err.to_string())),
        }
    }
}
