#![forbid(unsafe_code)]

//! Frame timestamps.

use cheetah_core::Timestamp;

/// Where frame timestamps come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSource {
    /// Microseconds since the Unix epoch, never decreasing between frames.
    #[default]
    WallClock,
    /// `start`, `start + step`, `start + 2 * step`, ...
    Counter { start: Timestamp, step: Timestamp },
}

/// Stateful reader of a [`TimeSource`].
#[derive(Debug, Clone)]
pub struct Clock {
    source: TimeSource,
    last: Option<Timestamp>,
}

impl Clock {
    pub fn new(source: TimeSource) -> Self {
        Self { source, last: None }
    }

    pub fn source(&self) -> TimeSource {
        self.source
    }

    /// Timestamp for the next frame.
    pub fn next_timestamp(&mut self) -> Timestamp {
        let t = match (self.source, self.last) {
            (TimeSource::WallClock, last) => {
                let now = wall_clock_micros();
                last.map_or(now, |prev| prev.max(now))
            }
            (TimeSource::Counter { start, .. }, None) => start,
            (TimeSource::Counter { step, .. }, Some(prev)) => prev.saturating_add(step),
        };
        self.last = Some(t);
        t
    }
}

/// Current wall-clock time in microseconds since the Unix epoch.
pub fn wall_clock_micros() -> Timestamp {
    let since_epoch = web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .unwrap_or_default();
    Timestamp::try_from(since_epoch.as_micros()).unwrap_or(Timestamp::MAX)
}
