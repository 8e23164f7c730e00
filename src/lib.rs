//! Empirical cache hierarchy characterization.
//!
//! Measures the average latency of strided read+write accesses over a sweep of working-set sizes
//! and strides. Latency knees along the size axis point at cache capacities; cliffs along the
//! stride axis point at line width and associativity.
pub mod clock;
pub mod kernel;
pub mod measure;
pub mod report;
pub mod sweep;
pub mod thread;

/// Convert number of bytes to formatted string
pub fn format_size(bytes: f32) -> String {
    const GB: f32 = 1024.0 * 1024.0 * 1024.0;
    const MB: f32 = 1024.0 * 1024.0;
    const KB: f32 = 1024.0;

    if bytes >= GB {
        format!("{:.2} GiB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.2} MiB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.2} KiB", bytes / KB)
    } else {
        format!("{:.2} B", bytes)
    }
}
