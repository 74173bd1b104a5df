//! Property-based invariant tests for the frame driver.
//!
//! 1. Counter timestamps advance by exactly `step` per frame.
//! 2. Every delivered frame is painted whole by the latest swapped-in generator.
//! 3. Delivered plus dropped frames equals iterations under transient failures.
//! 4. The frame size never changes across iterations.

use cheetah_core::{PixelBuffer, Rgb};
use cheetah_fx::{Generator, SolidSingle};
use cheetah_runtime::{Cadence, DriverConfig, FrameDriver, SinkError, TimeSource};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn config(start: i64, step: i64) -> DriverConfig {
    DriverConfig {
        cadence: Cadence::Tight,
        time_source: TimeSource::Counter { start, step },
    }
}

fn solid(shade: u8) -> Generator {
    Generator::SolidSingle(SolidSingle {
        color: Rgb::new(shade, shade, shade),
    })
}

#[derive(Debug, Clone)]
enum Op {
    Step,
    Swap(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![3 => Just(Op::Step), 1 => any::<u8>().prop_map(Op::Swap)]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Counter timestamps
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn counter_timestamps_are_arithmetic(
        start in -1_000_000i64..=1_000_000,
        step in 0i64..=10_000,
        n in 1usize..=50,
    ) {
        let (mut driver, _handle) = FrameDriver::new(
            PixelBuffer::new(1, 1),
            solid(0),
            |_: &PixelBuffer| Ok::<(), SinkError>(()),
            config(start, step),
        );
        for i in 0..n {
            let report = driver.step().unwrap();
            prop_assert_eq!(report.timestamp, start + i as i64 * step);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Swaps land between frames
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn frames_are_painted_by_latest_swap(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut delivered: Vec<PixelBuffer> = Vec::new();
        let mut expected = Vec::new();
        {
            let sink = |frame: &PixelBuffer| {
                delivered.push(frame.clone());
                Ok::<(), SinkError>(())
            };
            let (mut driver, handle) =
                FrameDriver::new(PixelBuffer::new(3, 2), solid(0), sink, config(0, 1));
            let mut current = 0u8;
            for op in &ops {
                match *op {
                    Op::Step => {
                        driver.step().unwrap();
                        expected.push(current);
                    }
                    Op::Swap(shade) => {
                        prop_assert!(handle.swap(solid(shade)));
                        current = shade;
                    }
                }
            }
        }
        prop_assert_eq!(delivered.len(), expected.len());
        for (frame, shade) in delivered.iter().zip(&expected) {
            prop_assert!(frame.as_bytes().iter().all(|b| b == shade));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Transient failures are counted, not fatal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn transient_failures_are_accounted(pattern in prop::collection::vec(any::<bool>(), 1..60)) {
        let mut calls = 0usize;
        let failures = pattern.clone();
        let sink = move |_: &PixelBuffer| {
            let fail = failures[calls];
            calls += 1;
            if fail { Err(SinkError::transient("flaky")) } else { Ok(()) }
        };
        let (mut driver, _handle) =
            FrameDriver::new(PixelBuffer::new(1, 1), solid(9), sink, config(0, 1));
        for _ in 0..pattern.len() {
            prop_assert!(driver.step().is_ok());
        }
        let dropped = pattern.iter().filter(|&&f| f).count() as u64;
        prop_assert_eq!(driver.frames_dropped(), dropped);
        prop_assert_eq!(driver.frames_delivered() + dropped, pattern.len() as u64);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Frame size is fixed
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn frame_size_is_fixed(w in 0usize..=8, h in 0usize..=8, n in 1usize..=10) {
        let (mut driver, handle) = FrameDriver::new(
            PixelBuffer::new(w, h),
            Generator::default(),
            |_: &PixelBuffer| Ok::<(), SinkError>(()),
            config(0, 100_000),
        );
        for i in 0..n {
            if i % 3 == 2 {
                handle.swap(Generator::defaults()[i % 9]);
            }
            driver.step().unwrap();
            prop_assert_eq!(driver.frame().as_bytes().len(), w * h * 3);
        }
    }
}
