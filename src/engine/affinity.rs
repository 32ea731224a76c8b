//! Best-effort CPU pinning for the pipeline threads.
//!
//! Pinning failures are never fatal; an unpinned thread only costs
//! latency, not correctness.

use tracing::{debug, warn};

/// Pin the current thread to `core_id`. Returns whether the pin took.
pub fn pin_current_thread(core_id: usize) -> bool {
    let Some(cores) = core_affinity::get_core_ids() else {
        warn!(core_id, "cannot enumerate CPU cores, thread not pinned");
        return false;
    };

    match cores.into_iter().find(|c| c.id == core_id) {
        Some(core) => {
            let pinned = core_affinity::set_for_current(core);
            if pinned {
                debug!(core_id, "thread pinned");
            } else {
                warn!(core_id, "pinning rejected by OS, thread not pinned");
            }
            pinned
        }
        None => {
            warn!(core_id, "no such CPU core, thread not pinned");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_to_bogus_core_is_non_fatal() {
        assert!(!pin_current_thread(usize::MAX));
    }
}
