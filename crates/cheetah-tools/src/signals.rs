#![forbid(unsafe_code)]

//! SIGINT/SIGTERM turned into a cooperative stop.
//!
//! While a [`SignalGuard`] is alive, termination signals no longer kill the
//! process; they call the guard's callback instead, so loops can wind down
//! and restore the terminal. Dropping the guard unregisters the handler.
//! On non-Unix targets the guard does nothing.

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

#[cfg(unix)]
#[derive(Debug)]
pub struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    pub fn new<F>(on_signal: F) -> std::io::Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(std::io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                tracing::warn!(signal, "termination signal received, stopping");
                on_signal();
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(not(unix))]
#[derive(Debug)]
pub struct SignalGuard;

#[cfg(not(unix))]
impl SignalGuard {
    pub fn new<F>(_on_signal: F) -> std::io::Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        Ok(Self)
    }
}
