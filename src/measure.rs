//! Calibrated measurement: one warm-up pass, then one overhead and one access run under the same
//! parameters. The difference, clamped at zero, is spread over every touch made.
use crate::clock::Clock;
use crate::kernel::Buffer;
use crate::sweep::RunConfig;
use log::debug;

/// Timings for one sweep configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Elapsed time of the overhead kernel
    pub overhead_ns: u64,
    /// Elapsed time of the access kernel
    pub actual_ns: u64,
    /// `actual_ns - overhead_ns`, or zero if overhead came out larger
    pub net_ns: u64,
    /// `net_ns` divided over every access of every pass
    pub per_access_ns: f64,
}

impl Measurement {
    /// Derive net and per-access time from a raw overhead/actual pair
    pub fn from_timings(overhead_ns: u64, actual_ns: u64, run: RunConfig) -> Self {
        let net_ns = actual_ns.saturating_sub(overhead_ns);
        let per_access_ns = net_ns as f64 / (run.repeat as f64 * run.accesses as f64);
        Measurement {
            overhead_ns,
            actual_ns,
            net_ns,
            per_access_ns,
        }
    }

    /// True when noise pushed the overhead above the real measurement and net time was clamped
    pub fn clamped(&self) -> bool {
        self.overhead_ns > self.actual_ns
    }
}

/// Measure the per-access cost of striding through the first `size` words of `buffer`
pub fn measure<C: Clock>(
    buffer: &mut Buffer,
    clock: &C,
    size: usize,
    stride: usize,
    run: RunConfig,
) -> Measurement {
    // populate the cache before timing, result discarded
    buffer.access(clock, size, stride, 1);

    let overhead_ns = buffer.overhead(clock, size, stride, run.repeat);
    let actual_ns = buffer.access(clock, size, stride, run.repeat);

    let measurement = Measurement::from_timings(overhead_ns, actual_ns, run);
    debug!(
        "size {} stride {} repeat {}: overhead {} ns, actual {} ns, net {} ns",
        size, stride, run.repeat, overhead_ns, actual_ns, measurement.net_ns
    );
    measurement
}
