#![forbid(unsafe_code)]

//! Frame handoff between a producer thread and a consumer thread.
//!
//! The producer paints into its own [`PixelBuffer`] and publishes the
//! finished frame by copying it into the shared slot under a lock. The
//! consumer copies the slot out under the same lock and works on its copy.
//! The lock is held only across those copies, so a consumer can never see
//! a frame that is still being painted, and a slow consumer never blocks
//! painting.
//!
//! Every publish bumps a generation counter so consumers can skip frames
//! they have already seen.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use cheetah_core::{BufferSizeMismatch, PixelBuffer};

use crate::sink::{FrameSink, SinkError};
use crate::stop_signal::StopSignal;

#[derive(Debug)]
struct Slot {
    frame: PixelBuffer,
    generation: u64,
}

/// Shared, lock-protected copy of the latest published frame.
#[derive(Debug, Clone)]
pub struct SharedFrame {
    inner: Arc<(Mutex<Slot>, Condvar)>,
    width: usize,
    height: usize,
}

impl SharedFrame {
    /// A black slot at generation 0.
    pub fn new(width: usize, height: usize) -> Self {
        let slot = Slot {
            frame: PixelBuffer::new(width, height),
            generation: 0,
        };
        Self {
            inner: Arc::new((Mutex::new(slot), Condvar::new())),
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Generation of the frame currently in the slot.
    pub fn generation(&self) -> u64 {
        let (lock, _) = &*self.inner;
        lock.lock().unwrap_or_else(|e| e.into_inner()).generation
    }

    /// Copy a finished frame into the slot and wake consumers.
    pub fn publish(&self, frame: &PixelBuffer) -> Result<u64, BufferSizeMismatch> {
        let (lock, cvar) = &*self.inner;
        let mut slot = lock.lock().unwrap_or_else(|e| e.into_inner());
        slot.frame.copy_from(frame)?;
        slot.generation += 1;
        let generation = slot.generation;
        drop(slot);
        cvar.notify_all();
        Ok(generation)
    }

    /// Copy the current frame into `out`, returning its generation.
    pub fn read_into(&self, out: &mut PixelBuffer) -> Result<u64, BufferSizeMismatch> {
        let (lock, _) = &*self.inner;
        let slot = lock.lock().unwrap_or_else(|e| e.into_inner());
        out.copy_from(&slot.frame)?;
        Ok(slot.generation)
    }

    /// Wait up to `timeout` for a generation newer than `seen`.
    ///
    /// On success the newer frame is copied into `out` and its generation
    /// returned; `None` means the wait timed out and `out` is untouched.
    pub fn wait_newer(
        &self,
        seen: u64,
        timeout: Duration,
        out: &mut PixelBuffer,
    ) -> Result<Option<u64>, BufferSizeMismatch> {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let (slot, _) = cvar
            .wait_timeout_while(guard, timeout, |slot| slot.generation <= seen)
            .unwrap_or_else(|e| e.into_inner());
        if slot.generation <= seen {
            return Ok(None);
        }
        out.copy_from(&slot.frame)?;
        Ok(Some(slot.generation))
    }
}

impl FrameSink for SharedFrame {
    fn deliver(&mut self, frame: &PixelBuffer) -> Result<(), SinkError> {
        self.publish(frame)
            .map(|_| ())
            .map_err(|err| SinkError::fatal(err.to_string()))
    }
}

/// Forward frames from `shared` to `sink` until `stop` is set.
///
/// Each published generation is delivered at most once; frames published
/// faster than the sink accepts them are skipped. Transient sink errors
/// are logged and skipped. Returns the number of frames delivered, or the
/// first fatal error.
pub fn relay<S: FrameSink>(
    shared: &SharedFrame,
    sink: &mut S,
    stop: &StopSignal,
    poll: Duration,
) -> Result<u64, SinkError> {
    let mut local = PixelBuffer::new(shared.width(), shared.height());
    let mut seen = 0;
    let mut delivered = 0u64;

    while !stop.is_stopped() {
        let generation = match shared.wait_newer(seen, poll, &mut local) {
            Ok(Some(generation)) => generation,
            Ok(None) => continue,
            Err(err) => return Err(SinkError::fatal(err.to_string())),
        };
        if generation > seen + 1 {
            tracing::trace!(skipped = generation - seen - 1, "relay skipped frames");
        }
        seen = generation;

        match sink.deliver(&local) {
            Ok(()) => delivered += 1,
            Err(err) if err.is_fatal() => {
                tracing::error!(generation, error = %err, "relay sink failed");
                return Err(err);
            }
            Err(err) => tracing::warn!(generation, error = %err, "relay delivery failed"),
        }
    }

    tracing::debug!(delivered, "relay stopped");
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cheetah_core::Rgb;
    use std::thread;

    fn solid(w: usize, h: usize, color: Rgb) -> PixelBuffer {
        let mut frame = PixelBuffer::new(w, h);
        frame.fill(color);
        frame
    }

    #[test]
    fn publish_bumps_generation() {
        let shared = SharedFrame::new(2, 2);
        assert_eq!(shared.generation(), 0);
        assert_eq!(shared.publish(&solid(2, 2, Rgb::WHITE)).unwrap(), 1);
        assert_eq!(shared.publish(&solid(2, 2, Rgb::BLACK)).unwrap(), 2);
        assert_eq!(shared.generation(), 2);
    }

    #[test]
    fn publish_rejects_wrong_size() {
        let shared = SharedFrame::new(2, 2);
        assert!(shared.publish(&PixelBuffer::new(3, 2)).is_err());
        assert_eq!(shared.generation(), 0);
    }

    #[test]
    fn read_into_copies_latest() {
        let shared = SharedFrame::new(1, 1);
        shared.publish(&solid(1, 1, Rgb::new(9, 8, 7))).unwrap();
        let mut out = PixelBuffer::new(1, 1);
        assert_eq!(shared.read_into(&mut out).unwrap(), 1);
        assert_eq!(out.pixel(0, 0), Some(Rgb::new(9, 8, 7)));
    }

    #[test]
    fn wait_newer_times_out_without_publish() {
        let shared = SharedFrame::new(1, 1);
        let mut out = solid(1, 1, Rgb::WHITE);
        let got = shared
            .wait_newer(0, Duration::from_millis(10), &mut out)
            .unwrap();
        assert_eq!(got, None);
        assert_eq!(out.pixel(0, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn wait_newer_sees_cross_thread_publish() {
        let shared = SharedFrame::new(2, 1);
        let producer = shared.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            producer.publish(&solid(2, 1, Rgb::new(1, 2, 3))).unwrap();
        });
        let mut out = PixelBuffer::new(2, 1);
        let got = shared
            .wait_newer(0, Duration::from_secs(5), &mut out)
            .unwrap();
        handle.join().unwrap();
        assert_eq!(got, Some(1));
        assert_eq!(out.pixel(1, 0), Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn consumer_never_sees_torn_frames() {
        let shared = SharedFrame::new(16, 16);
        let producer = shared.clone();
        let handle = thread::spawn(move || {
            for i in 0..200u32 {
                let frame = solid(16, 16, Rgb::new((i % 256) as u8, 0, 0));
                producer.publish(&frame).unwrap();
            }
        });
        let mut out = PixelBuffer::new(16, 16);
        for _ in 0..200 {
            shared.read_into(&mut out).unwrap();
            let first = out.as_bytes()[0];
            assert!(out.as_bytes().chunks_exact(3).all(|px| px[0] == first));
        }
        handle.join().unwrap();
    }

    #[test]
    fn relay_forwards_until_stopped() {
        let shared = SharedFrame::new(1, 1);
        let (signal, trigger) = StopSignal::new();
        let producer = shared.clone();
        let stopper = trigger.clone();
        let handle = thread::spawn(move || {
            for _ in 0..3 {
                producer.publish(&solid(1, 1, Rgb::WHITE)).unwrap();
                thread::sleep(Duration::from_millis(20));
            }
            stopper.stop();
        });

        let mut received = Vec::new();
        let mut sink = |frame: &PixelBuffer| {
            received.push(frame.pixel(0, 0));
            Ok::<(), SinkError>(())
        };
        let delivered = relay(&shared, &mut sink, &signal, Duration::from_millis(5)).unwrap();
        handle.join().unwrap();
        assert!((1..=3).contains(&delivered), "delivered={delivered}");
        assert!(received.iter().all(|&px| px == Some(Rgb::WHITE)));
    }

    #[test]
    fn relay_stops_on_fatal_sink_error() {
        let shared = SharedFrame::new(1, 1);
        shared.publish(&PixelBuffer::new(1, 1)).unwrap();
        let (signal, _trigger) = StopSignal::new();
        let mut sink = |_: &PixelBuffer| Err::<(), _>(SinkError::fatal("unplugged"));
        let err = relay(&shared, &mut sink, &signal, Duration::from_millis(5)).unwrap_err();
        assert!(err.is_fatal());
    }
}
