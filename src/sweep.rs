//! # Sweep
//!
//! Enumerates the (working-set size, stride) space in report order, sizes ascending and strides
//! ascending within each size, and runs a calibrated measurement for every point. Each point gets
//! enough passes that the total number of touches reaches the configured sample target, which is
//! what keeps a single overhead/access pair stable from a 1 KiB working set up to 8 MiB.
//!
//! Strides stop at half the working-set size, so every pass touches at least two distinct words.
//! The resulting space is triangular: wide strides only show up for large sizes.
use crate::clock::Clock;
use crate::kernel::Buffer;
use crate::measure::{Measurement, measure};
use crate::report::OutputMode;
use log::{info, warn};
use std::io;
use std::iter::successors;

/// Smallest working set, in words
pub const ARRAY_MIN: usize = 1 << 8;
/// Largest working set, in words. Also the buffer length.
pub const ARRAY_MAX: usize = 1 << 21;
/// Smallest stride, in words
pub const STRIDE_MIN: usize = 1 << 0;
/// Largest stride, in words
pub const STRIDE_MAX: usize = 1 << 16;
/// Approximate number of touches per configuration. Larger gives better statistics but slower
/// sweeps; it is a floor, never exceeded by less than one pass.
pub const SAMPLE_TARGET: usize = 50_000_000;

/// Bounds of a sweep. All bounds are powers of two, in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    pub array_min: usize,
    pub array_max: usize,
    pub stride_min: usize,
    pub stride_max: usize,
    pub sample_target: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            array_min: ARRAY_MIN,
            array_max: ARRAY_MAX,
            stride_min: STRIDE_MIN,
            stride_max: STRIDE_MAX,
            sample_target: SAMPLE_TARGET,
        }
    }
}

impl SweepConfig {
    /// Check the bounds describe a sweep that can be run
    pub fn validate(&self) -> io::Result<()> {
        let bounds = [
            ("array_min", self.array_min),
            ("array_max", self.array_max),
            ("stride_min", self.stride_min),
            ("stride_max", self.stride_max),
        ];
        for (name, value) in bounds {
            if !value.is_power_of_two() {
                return Err(invalid(format!("{name} ({value}) must be a power of two")));
            }
        }
        if self.array_min > self.array_max {
            return Err(invalid(format!(
                "array_min ({}) exceeds array_max ({})",
                self.array_min, self.array_max
            )));
        }
        if self.stride_min > self.stride_max {
            return Err(invalid(format!(
                "stride_min ({}) exceeds stride_max ({})",
                self.stride_min, self.stride_max
            )));
        }
        if self.sample_target == 0 {
            return Err(invalid("sample_target must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Working-set sizes in sweep order
    pub fn sizes(&self) -> impl Iterator<Item = usize> + use<> {
        let max = self.array_max;
        doubling(self.array_min).take_while(move |&size| size <= max)
    }

    /// Strides tested for a working set of `size` words, ascending
    pub fn strides_for(&self, size: usize) -> impl Iterator<Item = usize> + use<> {
        let max = self.stride_max;
        doubling(self.stride_min).take_while(move |&stride| stride <= max && stride <= size / 2)
    }

    /// Every stride in `[stride_min, stride_max]`, the columns of the CSV matrix
    pub fn csv_strides(&self) -> impl Iterator<Item = usize> + use<> {
        let max = self.stride_max;
        doubling(self.stride_min).take_while(move |&stride| stride <= max)
    }

    /// Lazily generated sweep points, in the same order [`BenchContext::run`] measures them
    pub fn points(&self) -> impl Iterator<Item = SweepPoint> + use<> {
        let config = *self;
        self.sizes().flat_map(move |size| {
            config
                .strides_for(size)
                .map(move |stride| SweepPoint { size, stride })
        })
    }
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

fn doubling(start: usize) -> impl Iterator<Item = usize> {
    successors(Some(start), |&n| n.checked_mul(2))
}

/// One (working-set size, stride) pair, both in words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPoint {
    pub size: usize,
    pub stride: usize,
}

impl SweepPoint {
    /// Pass count and touches per pass needed to reach `sample_target` touches
    pub fn run_config(&self, sample_target: usize) -> RunConfig {
        let accesses = self.size / self.stride;
        RunConfig {
            accesses,
            repeat: 1 + sample_target / accesses,
        }
    }
}

/// Kernel parameters derived from a [`SweepPoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Touches per pass
    pub accesses: usize,
    /// Passes per timed kernel call, at least 1
    pub repeat: usize,
}

/// Receives sweep events in order. Size groups are announced even if no stride fits them.
pub trait SweepObserver {
    /// Called once before the first size
    fn begin_sweep(&mut self, _config: &SweepConfig) -> io::Result<()> {
        Ok(())
    }

    /// Called before the strides of a working-set size are measured
    fn begin_size(&mut self, _size: usize) -> io::Result<()> {
        Ok(())
    }

    /// Called with every measurement, immediately after it's taken
    fn record(&mut self, point: SweepPoint, measurement: &Measurement) -> io::Result<()>;

    /// Called after the last stride of a working-set size
    fn end_size(&mut self, _size: usize) -> io::Result<()> {
        Ok(())
    }

    /// Called once after the last size
    fn end_sweep(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Totals gathered over a sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Configurations measured
    pub configurations: usize,
    /// Configurations whose net time was clamped to zero
    pub clamped: usize,
}

impl SweepSummary {
    /// Fraction of configurations where overhead exceeded the real measurement
    pub fn clamp_rate(&self) -> f64 {
        if self.configurations == 0 {
            0.0
        } else {
            self.clamped as f64 / self.configurations as f64
        }
    }
}

/// State of one program run: the shared buffer, the sweep bounds and the output mode
pub struct BenchContext {
    buffer: Buffer,
    config: SweepConfig,
    mode: OutputMode,
}

impl BenchContext {
    /// Validate `config` and allocate a buffer covering its largest working set
    pub fn new(config: SweepConfig, mode: OutputMode) -> io::Result<Self> {
        config.validate()?;
        Ok(BenchContext {
            buffer: Buffer::new(config.array_max),
            config,
            mode,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Measure every sweep point in order, handing each result to `observer`
    pub fn run<C: Clock, O: SweepObserver>(
        &mut self,
        clock: &C,
        observer: &mut O,
    ) -> io::Result<SweepSummary> {
        let config = self.config;
        let mut summary = SweepSummary::default();
        info!(
            "Sweeping sizes {}..={} words, strides {}..={} words, ~{} touches each",
            config.array_min,
            config.array_max,
            config.stride_min,
            config.stride_max,
            config.sample_target
        );

        observer.begin_sweep(&config)?;
        for size in config.sizes() {
            observer.begin_size(size)?;
            for stride in config.strides_for(size) {
                let point = SweepPoint { size, stride };
                let run = point.run_config(config.sample_target);
                let measurement = measure(&mut self.buffer, clock, size, stride, run);

                summary.configurations += 1;
                if measurement.clamped() {
                    summary.clamped += 1;
                }
                observer.record(point, &measurement)?;
            }
            observer.end_size(size)?;
        }
        observer.end_sweep()?;

        info!(
            "Sweep done: {} configurations, {} clamped ({:.2}%)",
            summary.configurations,
            summary.clamped,
            100.0 * summary.clamp_rate()
        );
        if summary.clamped > 0 {
            warn!(
                "Overhead exceeded the access time in {} configurations, those report 0.000 ns",
                summary.clamped
            );
        }
        Ok(summary)
    }
}
