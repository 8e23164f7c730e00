//! Shared helpers for integration tests
#![allow(dead_code)]

use cache_sweep_rs::clock::Clock;
use cache_sweep_rs::measure::Measurement;
use cache_sweep_rs::sweep::{SweepConfig, SweepObserver, SweepPoint};
use std::cell::Cell;
use std::io;

/// Sweep from the end-to-end scenario: two sizes, strides up to 256 words, 1000 touches
pub fn small_config() -> SweepConfig {
    SweepConfig {
        array_min: 256,
        array_max: 512,
        stride_min: 1,
        stride_max: 256,
        sample_target: 1000,
    }
}

/// Clock whose kernel intervals follow a fixed cycle: warm-up, overhead, access.
/// Readings come in start/stop pairs, one pair per kernel call.
pub struct PatternClock {
    intervals: [u64; 3],
    reads: Cell<usize>,
    now: Cell<u64>,
}

impl PatternClock {
    pub fn new(warm_up_ns: u64, overhead_ns: u64, access_ns: u64) -> Self {
        PatternClock {
            intervals: [warm_up_ns, overhead_ns, access_ns],
            reads: Cell::new(0),
            now: Cell::new(0),
        }
    }
}

impl Clock for PatternClock {
    fn now(&self) -> u64 {
        let read = self.reads.get();
        self.reads.set(read + 1);
        if read % 2 == 1 {
            self.now.set(self.now.get() + self.intervals[(read / 2) % 3]);
        }
        self.now.get()
    }
}

/// Observer that keeps every event for inspection
#[derive(Default)]
pub struct Collector {
    pub sizes: Vec<usize>,
    pub ended: Vec<usize>,
    pub records: Vec<(SweepPoint, Measurement)>,
    pub finished: bool,
}

impl SweepObserver for Collector {
    fn begin_size(&mut self, size: usize) -> io::Result<()> {
        self.sizes.push(size);
        Ok(())
    }

    fn record(&mut self, point: SweepPoint, measurement: &Measurement) -> io::Result<()> {
        self.records.push((point, *measurement));
        Ok(())
    }

    fn end_size(&mut self, size: usize) -> io::Result<()> {
        self.ended.push(size);
        Ok(())
    }

    fn end_sweep(&mut self) -> io::Result<()> {
        self.finished = true;
        Ok(())
    }
}
