#![forbid(unsafe_code)]

//! Frame driver runtime.
//!
//! A [`FrameDriver`] owns one [`PixelBuffer`](cheetah_core::PixelBuffer),
//! repaints it with the active generator on every iteration and hands the
//! finished frame to a [`FrameSink`]. Control (stop, generator swap) goes
//! through the [`DriverHandle`] returned alongside the driver.
//!
//! When producer and consumer live on different threads, [`SharedFrame`]
//! is the handoff: the driver publishes into it, [`relay`] forwards from it.
//!
//! # Key Types
//!
//! - [`FrameDriver`] / [`DriverHandle`] - the loop and its remote control
//! - [`DriverConfig`] - [`Cadence`] and [`TimeSource`]
//! - [`FrameSink`] / [`SinkError`] - frame consumers and their failures
//! - [`StopSignal`] / [`StopTrigger`] - cooperative cancellation

pub mod clock;
pub mod driver;
pub mod shared_frame;
pub mod sink;
pub mod stop_signal;

pub use clock::{Clock, TimeSource, wall_clock_micros};
pub use driver::{
    Cadence, DriverConfig, DriverError, DriverHandle, DriverState, FrameDriver, FrameReport,
};
pub use shared_frame::{SharedFrame, relay};
pub use sink::{FrameSink, NullSink, SinkError, SinkErrorKind};
pub use stop_signal::{StopSignal, StopTrigger};
