//! Cache hierarchy sweep
//!
//! Prints the average read+write latency for every (working-set size, stride) pair. Pass `-c`
//! (or anything starting with it, like `-csv`) for a CSV matrix instead of one line per pair.
//! Log output goes to stderr and is controlled with `RUST_LOG`.
use cache_sweep_rs::clock::PlatformClock;
use cache_sweep_rs::report::{OutputMode, Reporter};
use cache_sweep_rs::sweep::{BenchContext, SweepConfig};
use cache_sweep_rs::thread::tune_current_thread;
use log::{debug, error, info};
use std::io;

// use faster/smaller `mimalloc` allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mode = OutputMode::from_args(std::env::args_os().skip(1));

    let clock = PlatformClock::new().inspect_err(|e| error!("No usable clock: {}", e))?;

    tune_current_thread(None);

    let mut ctx = BenchContext::new(SweepConfig::default(), mode)?;
    debug!("Sweep configuration: {:?}", ctx.config());
    let mut reporter = Reporter::new(io::stdout().lock(), ctx.mode());
    ctx.run(&clock, &mut reporter)?;

    info!("Cache sweep completed!");
    Ok(())
}
