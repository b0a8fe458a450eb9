//! Supervisor — wires the Scheduler, Updater, and Health Watcher together
//! and owns the process lifetime: startup mode selection, the two
//! long-running loops, and graceful shutdown on SIGINT/SIGTERM.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::config::Mode;
use crate::health::HealthWatcher;
use crate::notifier::Notifier;
use crate::scheduler::{Cadence, Scheduler};
use crate::state::SharedState;
use crate::updater::Updater;

pub struct Supervisor {
    state: SharedState,
    notifier: Notifier,
}

impl Supervisor {
    pub fn new(state: SharedState, notifier: Notifier) -> Self {
        Self { state, notifier }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.state.config.clone();

        if config.health_check_only {
            return self.health_check().await;
        }

        if config.run_once {
            Updater::new(self.state.clone()).run(&self.notifier).await;
            return Ok(());
        }

        let update_enabled = matches!(config.mode, Mode::Full | Mode::Update | Mode::Monitor);
        let watch_enabled = config.health_watch && matches!(config.mode, Mode::Full | Mode::Watch);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut handles = Vec::new();

        if update_enabled {
            let state = self.state.clone();
            let notifier = self.notifier.clone();
            handles.push(tokio::spawn(update_loop(state, notifier, shutdown_rx.clone())));
        }

        if watch_enabled {
            let state = self.state.clone();
            let notifier = self.notifier.clone();
            handles.push(tokio::spawn(health_loop(state, notifier, shutdown_rx.clone())));
        }

        if handles.is_empty() {
            tracing::warn!("neither the update loop nor the health loop is enabled; idling until shutdown");
        }

        shutdown_signal().await;
        tracing::info!("shutdown signal received, waiting for in-flight cycles to quiesce");
        let _ = shutdown_tx.send(true);
        for handle in handles {
            let _ = handle.await;
        }
        Ok(())
    }

    /// `--health-check`: a single liveness probe against the engine, exit
    /// code communicates the result. Distinct from the long-running Health
    /// Watcher loop.
    async fn health_check(&self) -> anyhow::Result<()> {
        self.state.engine.ping().await.map_err(|e| anyhow::anyhow!("engine unreachable: {e}"))
    }
}

/// Single-flight by construction: the next tick is never awaited until the
/// previous cycle's `run()` has returned, so cycles never overlap. Shutdown
/// is cooperative: the watch channel is only consulted between cycles, never
/// used to abort one mid-flight, so a recreate is never interrupted between
/// "removed" and "created".
async fn update_loop(state: SharedState, notifier: Notifier, mut shutdown: watch::Receiver<bool>) {
    let mut scheduler = Scheduler::new(Cadence::from_config(&state.config));
    let updater = Updater::new(state);
    loop {
        tokio::select! {
            _ = scheduler.tick() => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() {
            break;
        }
        updater.run(&notifier).await;
    }
}

async fn health_loop(state: SharedState, notifier: Notifier, mut shutdown: watch::Receiver<bool>) {
    let watcher = HealthWatcher::new(state.clone());
    let mut interval = tokio::time::interval(Duration::from_secs(state.config.health_tick_interval_secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() {
            break;
        }
        watcher.tick(&notifier).await;
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WardenConfig;
    use crate::engine::FakeEngine;
    use crate::model::{ContainerState, HealthStatus, ImageRef};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn container(id: &str) -> crate::model::ContainerSnapshot {
        crate::model::ContainerSnapshot {
            id: id.to_string(),
            name: id.to_string(),
            image: ImageRef::parse("svc:latest"),
            image_id: "sha256:A".to_string(),
            state: ContainerState::Running,
            health: HealthStatus::None,
            labels: HashMap::new(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn run_once_performs_exactly_one_cycle() {
        let engine = Arc::new(FakeEngine::new());
        engine.seed_container(container("c1"), true).await;
        engine.set_remote_digest("svc:latest", "sha256:B").await;

        let mut config = WardenConfig::default();
        config.run_once = true;
        let state = Arc::new(crate::state::WardenState::new(engine.clone(), config));

        Supervisor::new(state.clone(), Notifier::new(None)).run().await.unwrap();

        assert_eq!(engine.recreate_call_count().await, 1);
        assert_eq!(state.cycle_stats.snapshot().await.total_updated, 1);
    }

    #[tokio::test]
    async fn health_check_only_pings_the_engine_and_exits() {
        let engine = Arc::new(FakeEngine::new());
        let mut config = WardenConfig::default();
        config.health_check_only = true;
        let state = Arc::new(crate::state::WardenState::new(engine, config));

        let result = Supervisor::new(state, Notifier::new(None)).run().await;
        assert!(result.is_ok());
    }
}
