#![forbid(unsafe_code)]

//! Drive an animation generator into a display or the terminal.
//!
//! The frame driver runs on its own thread and publishes into a
//! [`SharedFrame`]; the main thread relays published frames to the output.
//! A slow output skips frames instead of slowing the driver down.

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use cheetah_client::{DeviceError, DisplayClient, HttpTransport};
use cheetah_core::PixelBuffer;
use cheetah_fx::{AnimationGenerator, catalog};
use cheetah_runtime::{DriverConfig, FrameDriver, FrameSink, SharedFrame, relay};
use cheetah_tools::cli::{AnimateOpts, Output};
use cheetah_tools::device_sink::DeviceSink;
use cheetah_tools::preview::TerminalPreview;
use cheetah_tools::signals::SignalGuard;

const RELAY_POLL: Duration = Duration::from_millis(50);

fn connect(host: &str, opts: &AnimateOpts) -> Result<DisplayClient<HttpTransport>, DeviceError> {
    let mut client = DisplayClient::connect(HttpTransport::new(host)?)?;
    if let Some(path) = &opts.pixels_path {
        client = client.with_pixels_path(path.clone());
    }
    if let Some(level) = opts.brightness {
        client.set_brightness(level)?;
    }
    Ok(client)
}

/// Run the driver until stopped, relaying into `sink`. Returns whether the
/// run ended without a fatal error.
fn animate<S: FrameSink>(opts: &AnimateOpts, sink: &mut S) -> bool {
    let shared = SharedFrame::new(opts.width, opts.height);
    let config = DriverConfig {
        cadence: opts.cadence,
        time_source: opts.time_source,
    };
    let (mut driver, handle) = FrameDriver::new(
        PixelBuffer::new(opts.width, opts.height),
        opts.generator,
        shared.clone(),
        config,
    );
    let stop = handle.stop_signal();

    let on_signal = handle.clone();
    let _signals = SignalGuard::new(move || on_signal.stop())
        .inspect_err(|err| tracing::warn!(error = %err, "signal handling unavailable"))
        .ok();

    if let Some(after) = opts.exit_after {
        let timer = handle.clone();
        let stopped = stop.clone();
        thread::spawn(move || {
            if !stopped.wait_timeout(after) {
                tracing::info!(after_ms = after.as_millis() as u64, "exit timer elapsed");
                timer.stop();
            }
        });
    }

    tracing::info!(
        generator = opts.generator.name(),
        width = opts.width,
        height = opts.height,
        "animation started"
    );
    let finisher = handle.clone();
    let producer = thread::spawn(move || {
        let result = driver.run();
        // Release the relay whatever ended the run.
        finisher.stop();
        result
    });
    let relayed = relay(&shared, sink, &stop, RELAY_POLL);
    handle.stop();

    let mut ok = true;
    if let Err(err) = &relayed {
        tracing::error!(error = %err, "output failed");
        ok = false;
    }
    match producer.join() {
        Ok(Ok(frames)) => tracing::info!(
            frames,
            relayed = relayed.unwrap_or(0),
            "animation stopped"
        ),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "frame driver failed");
            ok = false;
        }
        Err(_) => {
            tracing::error!("frame driver panicked");
            ok = false;
        }
    }
    ok
}

fn main() -> ExitCode {
    let opts = AnimateOpts::parse();
    cheetah_tools::init_logging();

    if opts.list {
        println!("{:#}", catalog().to_json());
        return ExitCode::SUCCESS;
    }

    let ok = match &opts.output {
        Some(Output::Preview) => {
            let mut preview = TerminalPreview::stdout();
            let ok = animate(&opts, &mut preview);
            if let Err(err) = preview.finish() {
                tracing::warn!(error = %err, "terminal restore failed");
            }
            ok
        }
        Some(Output::Device { host }) => match connect(host, &opts) {
            Ok(client) => animate(&opts, &mut DeviceSink::new(client)),
            Err(err) => {
                tracing::error!(host = %host, error = %err, "cannot set up display");
                false
            }
        },
        None => false,
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
