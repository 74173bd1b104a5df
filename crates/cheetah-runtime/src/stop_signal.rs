#![forbid(unsafe_code)]

//! Cooperative stop signal shared between a frame loop and its controllers.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

type Shared = Arc<(Mutex<bool>, Condvar)>;

/// Observer of a stop request.
///
/// The frame driver polls it between frames and uses
/// [`wait_timeout`](Self::wait_timeout) as its inter-frame sleep, so a stop
/// arriving mid-sleep ends the sleep at once.
#[derive(Clone)]
pub struct StopSignal {
    inner: Shared,
}

impl StopSignal {
    /// A fresh, unstopped observer together with the trigger that stops it.
    pub fn new() -> (Self, StopTrigger) {
        let inner: Shared = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// `true` once any trigger has fired.
    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep up to `duration`, cut short by a stop.
    ///
    /// `true` means the loop should exit; `false` means the full delay
    /// passed and the next frame is due.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let (stopped, _) = cvar
            .wait_timeout_while(guard, duration, |stopped| !*stopped)
            .unwrap_or_else(|e| e.into_inner());
        *stopped
    }
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Fires a stop. Every clone, and every signal it hands out, shares one flag.
#[derive(Clone)]
pub struct StopTrigger {
    inner: Shared,
}

impl StopTrigger {
    /// Set the flag and wake any sleeping loop. Firing twice is harmless.
    pub fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(|e| e.into_inner());
        *stopped = true;
        cvar.notify_all();
    }

    /// Another observer of this trigger's flag.
    pub fn signal(&self) -> StopSignal {
        StopSignal {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for StopTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopTrigger").finish_non_exhaustive()
    }
}
