//! CycleStats — monotonic aggregate counters for the Updater's cycle history.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use tokio::sync::RwLock;

/// Forces the wrapped counters onto their own cache line, avoiding false
/// sharing between the hot update-counters and the cold `last_run` lock.
#[repr(align(64))]
#[derive(Debug, Default)]
struct CacheAligned<T>(T);

#[derive(Debug, Default)]
struct Counters {
    total_updated: AtomicU64,
    total_failed: AtomicU64,
}

/// Aggregate, monotonically non-decreasing counters owned by the Supervisor.
#[derive(Debug, Default)]
pub struct CycleStats {
    counters: CacheAligned<Counters>,
    last_run: RwLock<Option<chrono::DateTime<chrono::Utc>>>,
}

#[derive(Debug, Clone, Copy)]
pub struct CycleStatsSnapshot {
    pub total_updated: u64,
    pub total_failed: u64,
    pub last_run: Option<chrono::DateTime<chrono::Utc>>,
}

impl CycleStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_updated(&self) {
        self.counters.0.total_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.counters.0.total_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn record_run_completed(&self) {
        *self.last_run.write().await = Some(chrono::Utc::now());
    }

    pub async fn snapshot(&self) -> CycleStatsSnapshot {
        CycleStatsSnapshot {
            total_updated: self.counters.0.total_updated.load(Ordering::Relaxed),
            total_failed: self.counters.0.total_failed.load(Ordering::Relaxed),
            last_run: *self.last_run.read().await,
        }
    }
}

/// Cache-aligned gauge counters for the Health Watcher's `{monitored_containers,
/// gave_up_containers, max_restart_attempts}` stats, atomics-only (no timestamp
/// field, so no lock is needed).
#[derive(Debug, Default)]
pub struct HealthStats {
    monitored: AtomicI64,
    gave_up: AtomicI64,
}

#[derive(Debug, Clone, Copy)]
pub struct HealthStatsSnapshot {
    pub monitored_containers: i64,
    pub gave_up_containers: i64,
    pub max_restart_attempts: u32,
}

impl HealthStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_monitored(&self, n: i64) {
        self.monitored.store(n, Ordering::Relaxed);
    }

    pub fn set_gave_up(&self, n: i64) {
        self.gave_up.store(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HealthStatsSnapshot {
        HealthStatsSnapshot {
            monitored_containers: self.monitored.load(Ordering::Relaxed),
            gave_up_containers: self.gave_up.load(Ordering::Relaxed),
            max_restart_attempts: super::health_entry::MAX_RESTART_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_accumulate_and_snapshot() {
        let stats = CycleStats::new();
        stats.record_updated();
        stats.record_updated();
        stats.record_failed();
        stats.record_run_completed().await;

        let snap = stats.snapshot().await;
        assert_eq!(snap.total_updated, 2);
        assert_eq!(snap.total_failed, 1);
        assert!(snap.last_run.is_some());
    }

    #[test]
    fn health_stats_snapshot_reflects_gauges() {
        let stats = HealthStats::new();
        stats.set_monitored(3);
        stats.set_gave_up(1);
        let snap = stats.snapshot();
        assert_eq!(snap.monitored_containers, 3);
        assert_eq!(snap.gave_up_containers, 1);
        assert_eq!(snap.max_restart_attempts, 5);
    }
}
