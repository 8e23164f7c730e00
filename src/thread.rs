//! Best-effort tuning of the measuring thread. Pinning keeps the working set in one core's
//! private caches and avoids migrations mid-measurement; maximum priority reduces preemption.
//! Neither is required for a valid sweep, so failures only produce warnings.
use log::{debug, warn};

/// Pin the current thread to `cpu_core` (or the first core reported by the OS when `None`) and
/// raise it to maximum priority. Returns the core pinned to, if any.
pub fn tune_current_thread(cpu_core: Option<usize>) -> Option<usize> {
    let core = cpu_core.or_else(|| {
        core_affinity::get_core_ids()
            .and_then(|ids| ids.first().map(|core| core.id))
    });

    let pinned = match core {
        Some(cpu_num) => {
            if core_affinity::set_for_current(core_affinity::CoreId { id: cpu_num }) {
                debug!("Pinned measuring thread to CPU core {}", cpu_num);
                Some(cpu_num)
            } else {
                warn!(
                    "Couldn't pin measuring thread to CPU core {} (NOTE: this is expected on macOS)",
                    cpu_num
                );
                None
            }
        }
        None => {
            warn!("Couldn't list CPU cores, measuring thread is not pinned");
            None
        }
    };

    if thread_priority::set_current_thread_priority(thread_priority::ThreadPriority::Max).is_err() {
        warn!("Couldn't set measuring thread to maximum thread priority");
    }

    pinned
}
