#![forbid(unsafe_code)]

//! Glue for the `cheetah-countdown` and `cheetah-animate` binaries.
//!
//! Everything that can be tested without a terminal or a device lives here;
//! the binaries only wire it together.
//!
//! # Key Types
//!
//! - [`cli::CountdownOpts`] / [`cli::AnimateOpts`] - parsed command lines
//! - [`countdown::Countdown`] - per-second countdown text
//! - [`preview::TerminalPreview`] - ANSI true-color frame sink
//! - [`device_sink::DeviceSink`] - frame sink pushing pixels to a display
//! - [`signals::SignalGuard`] - Ctrl-C as a cooperative stop

pub mod cli;
pub mod countdown;
pub mod device_sink;
pub mod preview;
pub mod signals;

/// Install the stderr `tracing` subscriber. `RUST_LOG` wins over `info`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
