#![forbid(unsafe_code)]

//! The frame loop.
//!
//! ```text
//!   Idle ──run()/step()──▶ Running ──stop / fatal sink error──▶ Stopped
//! ```
//!
//! One iteration:
//! 1. apply the most recent pending generator swap, if any;
//! 2. read the next timestamp;
//! 3. let the active generator paint the whole frame;
//! 4. hand the finished frame to the sink;
//! 5. pace (or not) according to the [`Cadence`].
//!
//! Swaps and stop requests arrive through a [`DriverHandle`] and are only
//! looked at between iterations, so a frame is always painted by exactly
//! one generator and delivered whole.

use std::fmt;
use std::sync::mpsc;
use std::time::Duration;

use cheetah_core::{PixelBuffer, Timestamp};
use cheetah_fx::{AnimationGenerator, Generator};

use crate::clock::{Clock, TimeSource};
use crate::sink::{FrameSink, SinkError};
use crate::stop_signal::{StopSignal, StopTrigger};

/// Pacing policy between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// No sleep; throughput is bounded by the generator and the sink.
    Tight,
    /// Fixed delay after every delivery.
    Paced(Duration),
}

impl Cadence {
    /// `0` means [`Cadence::Tight`].
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Tight
        } else {
            Self::Paced(Duration::from_millis(ms))
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::Paced(Duration::from_millis(10))
    }
}

/// Frame driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverConfig {
    pub cadence: Cadence,
    pub time_source: TimeSource,
}

/// Lifecycle of a [`FrameDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

/// Why the driver loop ended with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The sink reported an unrecoverable failure.
    Sink(SinkError),
    /// The driver has already stopped and cannot be restarted.
    AlreadyStopped,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sink(err) => write!(f, "frame driver stopped: {err}"),
            Self::AlreadyStopped => write!(f, "frame driver already stopped"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sink(err) => Some(err),
            Self::AlreadyStopped => None,
        }
    }
}

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub timestamp: Timestamp,
    pub generator: &'static str,
    /// False when the sink reported a transient failure.
    pub delivered: bool,
}

/// Control side of a running [`FrameDriver`]; cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    trigger: StopTrigger,
    swaps: mpsc::Sender<Generator>,
}

impl DriverHandle {
    /// Ask the loop to stop after the current iteration.
    pub fn stop(&self) {
        self.trigger.stop();
    }

    /// Queue a generator to take over from the next frame on. Returns
    /// `false` when the driver no longer exists.
    pub fn swap(&self, generator: Generator) -> bool {
        self.swaps.send(generator).is_ok()
    }

    /// Stop signal observed by the driver.
    pub fn stop_signal(&self) -> StopSignal {
        self.trigger.signal()
    }
}

/// Owns the frame, the active generator and the sink, and runs the loop.
pub struct FrameDriver<S> {
    frame: PixelBuffer,
    generator: Generator,
    sink: S,
    clock: Clock,
    cadence: Cadence,
    state: DriverState,
    stop: StopSignal,
    swaps: mpsc::Receiver<Generator>,
    delivered: u64,
    dropped: u64,
}

impl<S: FrameSink> FrameDriver<S> {
    /// Create an idle driver painting into `frame`.
    pub fn new(
        frame: PixelBuffer,
        generator: Generator,
        sink: S,
        config: DriverConfig,
    ) -> (Self, DriverHandle) {
        let (stop, trigger) = StopSignal::new();
        let (tx, rx) = mpsc::channel();
        tracing::debug!(
            width = frame.width(),
            height = frame.height(),
            generator = generator.name(),
            cadence = ?config.cadence,
            time_source = ?config.time_source,
            "frame driver created"
        );
        let driver = Self {
            frame,
            generator,
            sink,
            clock: Clock::new(config.time_source),
            cadence: config.cadence,
            state: DriverState::Idle,
            stop,
            swaps: rx,
            delivered: 0,
            dropped: 0,
        };
        let handle = DriverHandle {
            trigger,
            swaps: tx,
        };
        (driver, handle)
    }

    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The generator that painted (or will paint) the current frame.
    #[inline]
    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// The most recently painted frame.
    #[inline]
    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    /// Frames the sink accepted.
    #[inline]
    pub fn frames_delivered(&self) -> u64 {
        self.delivered
    }

    /// Frames lost to transient sink failures.
    #[inline]
    pub fn frames_dropped(&self) -> u64 {
        self.dropped
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Apply the newest queued swap. Older queued swaps are discarded.
    fn apply_swaps(&mut self) {
        let mut latest = None;
        while let Ok(generator) = self.swaps.try_recv() {
            latest = Some(generator);
        }
        if let Some(generator) = latest {
            tracing::info!(
                from = self.generator.name(),
                to = generator.name(),
                "generator swapped"
            );
            self.generator = generator;
        }
    }

    /// Run one iteration without pacing.
    ///
    /// Moves an idle driver to `Running`. A fatal sink error moves it to
    /// `Stopped` and is returned; transient errors are logged and reported
    /// as an undelivered frame.
    pub fn step(&mut self) -> Result<FrameReport, DriverError> {
        match self.state {
            DriverState::Stopped => return Err(DriverError::AlreadyStopped),
            DriverState::Idle => self.state = DriverState::Running,
            DriverState::Running => {}
        }

        self.apply_swaps();
        let timestamp = self.clock.next_timestamp();
        self.generator.generate(timestamp, &mut self.frame);

        let delivered = match self.sink.deliver(&self.frame) {
            Ok(()) => {
                self.delivered += 1;
                true
            }
            Err(err) if err.is_fatal() => {
                tracing::error!(error = %err, delivered = self.delivered, "frame sink failed");
                self.state = DriverState::Stopped;
                return Err(DriverError::Sink(err));
            }
            Err(err) => {
                self.dropped += 1;
                tracing::warn!(error = %err, timestamp, "frame dropped");
                false
            }
        };

        tracing::trace!(
            timestamp,
            generator = self.generator.name(),
            delivered,
            "frame"
        );
        Ok(FrameReport {
            timestamp,
            generator: self.generator.name(),
            delivered,
        })
    }

    /// Loop until stopped through the handle or failed by the sink.
    ///
    /// Returns the number of frames delivered over the driver's lifetime.
    pub fn run(&mut self) -> Result<u64, DriverError> {
        if self.state == DriverState::Stopped {
            return Err(DriverError::AlreadyStopped);
        }
        tracing::info!(generator = self.generator.name(), "frame driver started");

        while !self.stop.is_stopped() {
            self.step()?;
            if let Cadence::Paced(delay) = self.cadence {
                if self.stop.wait_timeout(delay) {
                    break;
                }
            }
        }

        self.state = DriverState::Stopped;
        tracing::info!(
            delivered = self.delivered,
            dropped = self.dropped,
            "frame driver stopped"
        );
        Ok(self.delivered)
    }
}

impl<S> fmt::Debug for FrameDriver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDriver")
            .field("width", &self.frame.width())
            .field("height", &self.frame.height())
            .field("generator", &self.generator.name())
            .field("cadence", &self.cadence)
            .field("state", &self.state)
            .field("delivered", &self.delivered)
            .finish_non_exhaustive()
    }
}
