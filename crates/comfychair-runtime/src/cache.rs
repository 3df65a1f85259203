//! Short-lived memoization of liveness answers.
//!
//! Status queries, the start guard and the stop guard all ask the same
//! question about the same pid within a few seconds of each other. The cache
//! answers repeats from memory while the answer is fresh.
//!
//! # Locking
//!
//! One `RwLock` guards the whole map. Lookups take the read lock; inserts,
//! updates and evictions take the write lock. The probe is never called
//! while either lock is held.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use comfychair_core::{LivenessProbe, SupervisorSettings};
use tracing::debug;

/// Freshness and eviction windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTimings {
    /// An answer older than this is re-probed.
    pub ttl: Duration,
    /// Entries not checked for longer than this are evicted.
    pub max_idle: Duration,
    /// Sweeps run at most this often.
    pub sweep_interval: Duration,
}

impl Default for CacheTimings {
    fn default() -> Self {
        Self::from(&SupervisorSettings::default())
    }
}

impl From<&SupervisorSettings> for CacheTimings {
    fn from(settings: &SupervisorSettings) -> Self {
        Self {
            ttl: settings.cache_ttl(),
            max_idle: settings.cache_max_idle(),
            sweep_interval: settings.cache_sweep_interval(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    is_running: bool,
    last_checked: Instant,
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<u32, CacheEntry>,
    last_sweep: Instant,
}

/// Liveness cache shared behind an `Arc`.
pub struct StatusCache {
    probe: Arc<dyn LivenessProbe>,
    timings: CacheTimings,
    state: RwLock<CacheState>,
}

impl std::fmt::Debug for StatusCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusCache")
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

impl StatusCache {
    /// Cache with the default 5s TTL, 30s idle eviction and 5 min sweep.
    pub fn new(probe: Arc<dyn LivenessProbe>) -> Self {
        Self::with_timings(probe, CacheTimings::default())
    }

    pub fn with_timings(probe: Arc<dyn LivenessProbe>, timings: CacheTimings) -> Self {
        Self {
            probe,
            timings,
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Whether `pid` is running, answered from the cache while fresh.
    ///
    /// Pid `0` is never running and is never probed.
    pub fn is_running(&self, pid: u32) -> bool {
        if pid == 0 {
            return false;
        }

        self.maybe_sweep();

        let cached = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state
                .entries
                .get(&pid)
                .filter(|entry| entry.last_checked.elapsed() < self.timings.ttl)
                .map(|entry| entry.is_running)
        };

        match cached {
            Some(running) => running,
            None => self.refresh(pid),
        }
    }

    /// Probe `pid` now, ignoring any cached answer, and store the result.
    pub fn refresh(&self, pid: u32) -> bool {
        if pid == 0 {
            return false;
        }
        let running = self.probe.is_running(pid);
        self.record(pid, running);
        running
    }

    /// Store a known answer, e.g. right after a successful launch.
    pub fn record(&self, pid: u32, running: bool) {
        if pid == 0 {
            return;
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.insert(
            pid,
            CacheEntry {
                is_running: running,
                last_checked: Instant::now(),
            },
        );
    }

    /// Forget `pid`.
    pub fn invalidate(&self, pid: u32) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.remove(&pid);
    }

    fn maybe_sweep(&self) {
        let due = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state.last_sweep.elapsed() >= self.timings.sweep_interval
        };
        if !due {
            return;
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have swept between the two locks.
        if state.last_sweep.elapsed() < self.timings.sweep_interval {
            return;
        }
        let before = state.entries.len();
        let max_idle = self.timings.max_idle;
        state
            .entries
            .retain(|_, entry| entry.last_checked.elapsed() <= max_idle);
        state.last_sweep = Instant::now();
        debug!(
            evicted = before - state.entries.len(),
            remaining = state.entries.len(),
            "Swept liveness cache"
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}
