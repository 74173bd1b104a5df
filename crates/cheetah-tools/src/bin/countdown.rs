#![forbid(unsafe_code)]

//! Count down to a moment on a character display.

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use cheetah_client::{DeviceError, DisplayClient, HttpTransport, Transport};
use cheetah_tools::cli::CountdownOpts;
use cheetah_tools::countdown::{Countdown, Tick};
use chrono::Local;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn push<T: Transport>(client: &DisplayClient<T>, text: &str) {
    println!("{text}");
    if let Err(err) = client.set_text(text) {
        tracing::warn!(error = %err, "text push failed");
    }
}

fn main() -> ExitCode {
    let opts = CountdownOpts::parse();
    cheetah_tools::init_logging();

    let client = match HttpTransport::new(&opts.host)
        .map_err(DeviceError::from)
        .and_then(DisplayClient::connect)
    {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(host = %opts.host, error = %err, "cannot load display metadata");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(until = %opts.target, "countdown started");
    let mut countdown = Countdown::new(opts.target, opts.format, opts.text);
    loop {
        match countdown.poll(Local::now().naive_local()) {
            Tick::Idle => thread::sleep(POLL_INTERVAL),
            Tick::Show(text) => push(&client, &text),
            Tick::Finished(text) => {
                push(&client, &text);
                tracing::info!("countdown finished");
                return ExitCode::SUCCESS;
            }
        }
    }
}
