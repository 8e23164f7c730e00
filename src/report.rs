//! # Report
//!
//! Writes sweep results either as one human-readable line per measurement, or as a CSV matrix
//! with a stride per column and a working-set size per row. Rows of the matrix stop at the last
//! stride measured for that size, so the triangle of the sweep stays visible. All sizes and
//! strides are reported in bytes.
use crate::kernel::WORD_BYTES;
use crate::measure::Measurement;
use crate::sweep::{SweepConfig, SweepObserver, SweepPoint};
use std::ffi::OsStr;
use std::io::{self, Write};

/// Report layout, picked from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Human,
    Csv,
}

impl OutputMode {
    /// CSV if the first argument starts with `-c` (`-c`, `-csv`, ...), human-readable otherwise.
    /// `args` excludes the program name and need not be valid UTF-8.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        match args.into_iter().next() {
            Some(arg) if arg.as_ref().as_encoded_bytes().starts_with(b"-c") => OutputMode::Csv,
            _ => OutputMode::Human,
        }
    }
}

/// [`SweepObserver`] that writes the report to `out`, flushing after every measurement
pub struct Reporter<W: Write> {
    out: W,
    mode: OutputMode,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Reporter { out, mode }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SweepObserver for Reporter<W> {
    fn begin_sweep(&mut self, config: &SweepConfig) -> io::Result<()> {
        if self.mode == OutputMode::Csv {
            write!(self.out, ",")?;
            for stride in config.csv_strides() {
                write!(self.out, "{},", stride * WORD_BYTES)?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn begin_size(&mut self, size: usize) -> io::Result<()> {
        match self.mode {
            OutputMode::Csv => write!(self.out, "{},", size * WORD_BYTES),
            // blank line separates groups of the same size
            OutputMode::Human => writeln!(self.out),
        }
    }

    fn record(&mut self, point: SweepPoint, measurement: &Measurement) -> io::Result<()> {
        match self.mode {
            OutputMode::Csv => write!(self.out, "{:6.3},", measurement.per_access_ns)?,
            OutputMode::Human => writeln!(
                self.out,
                "Size (bytes): {:7} Stride (bytes): {:4} read+write: {:6.3} ns",
                point.size * WORD_BYTES,
                point.stride * WORD_BYTES,
                measurement.per_access_ns
            )?,
        }
        self.out.flush()
    }

    fn end_size(&mut self, _size: usize) -> io::Result<()> {
        if self.mode == OutputMode::Csv {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn end_sweep(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
