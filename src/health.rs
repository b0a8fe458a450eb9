//! Health Watcher — ticks on its own short cadence, restarting or notifying
//! on containers whose healthcheck has gone unhealthy.

use std::collections::HashSet;

use crate::config::HealthAction;
use crate::engine::ListOpts;
use crate::filter::{self, FilterPolicy};
use crate::model::snapshot::LABEL_WATCH_ACTION;
use crate::model::{ContainerSnapshot, HealthEntry, HealthStatus, UnhealthyOutcome, WardenEvent, MAX_RESTART_ATTEMPTS};
use crate::notifier::Notifier;
use crate::state::SharedState;

pub struct HealthWatcher {
    state: SharedState,
}

impl HealthWatcher {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    fn policy(&self) -> FilterPolicy {
        let config = &self.state.config;
        FilterPolicy {
            label_enable: config.label_enable,
            label_name: config.label_name.clone(),
            scope: config.scope.clone(),
            disable_list: config.disable_containers.clone(),
            include_stopped: false,
            self_identity: config.self_identity.clone(),
        }
    }

    /// One tick: list → filter (watch-enabled, running) → evaluate each →
    /// mark-and-sweep entries for containers no longer being watched.
    pub async fn tick(&self, notifier: &Notifier) {
        let snapshots = match self.state.engine.list(ListOpts { include_stopped: false }).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "health tick skipped: engine list failed");
                return;
            }
        };

        let policy = self.policy();
        let watched: Vec<ContainerSnapshot> = filter::apply(snapshots, &policy)
            .into_iter()
            .filter(|c| c.watch_enabled())
            .collect();

        let mut seen = HashSet::with_capacity(watched.len());
        for snapshot in &watched {
            seen.insert(snapshot.id.clone());
            self.evaluate(snapshot, notifier).await;
        }

        self.state.health.retain(|id, _| seen.contains(id));

        let gave_up = self.state.health.iter().filter(|entry| entry.gave_up()).count() as i64;
        self.state.health_stats.set_monitored(watched.len() as i64);
        self.state.health_stats.set_gave_up(gave_up);
    }

    async fn evaluate(&self, snapshot: &ContainerSnapshot, notifier: &Notifier) {
        let config = &self.state.config;

        {
            let mut entry = self
                .state
                .health
                .entry(snapshot.id.clone())
                .or_insert_with(|| HealthEntry::new(snapshot.image_id.clone()));
            entry.maybe_version_reset(&snapshot.image_id);
        }

        if snapshot.health != HealthStatus::Unhealthy {
            if let Some(mut entry) = self.state.health.get_mut(&snapshot.id) {
                entry.on_healthy();
            }
            return;
        }

        let outcome = {
            let mut entry = self.state.health.get_mut(&snapshot.id).expect("just inserted above");
            entry.on_unhealthy()
        };

        match outcome {
            UnhealthyOutcome::ShouldRestart(attempts) => {
                notifier.notify(WardenEvent::ContainerUnhealthy {
                    container_id: snapshot.id.clone(),
                    container_name: snapshot.name.clone(),
                    restart_attempts: attempts,
                    timestamp: chrono::Utc::now(),
                    message: format!("{} unhealthy (attempt {attempts}/{MAX_RESTART_ATTEMPTS})", snapshot.name),
                });

                let action = resolved_action(snapshot, config.health_action);
                if config.no_restart || action != HealthAction::Restart {
                    return;
                }

                let timeout = snapshot.stop_timeout(config.stop_timeout_secs);
                match self.state.engine.restart(&snapshot.id, timeout, Some(snapshot.stop_signal())).await {
                    Ok(()) => notifier.notify(WardenEvent::ContainerRestarted {
                        container_id: snapshot.id.clone(),
                        container_name: snapshot.name.clone(),
                        timestamp: chrono::Utc::now(),
                        message: format!("{} restarted", snapshot.name),
                    }),
                    Err(e) => tracing::error!(container = %snapshot.name, error = %e, "restart failed"),
                }
            }
            UnhealthyOutcome::GaveUp => {
                notifier.notify(WardenEvent::ContainerGaveUp {
                    container_id: snapshot.id.clone(),
                    container_name: snapshot.name.clone(),
                    max_attempts: MAX_RESTART_ATTEMPTS,
                    timestamp: chrono::Utc::now(),
                    message: format!("{} gave up after {MAX_RESTART_ATTEMPTS} restart attempts", snapshot.name),
                });
            }
            UnhealthyOutcome::AlreadyGaveUp => {
                tracing::debug!(container = %snapshot.name, "unhealthy, already gave up");
            }
        }
    }
}

/// Per-container `dockwarden.watch.action` label wins over the global default.
fn resolved_action(snapshot: &ContainerSnapshot, default: HealthAction) -> HealthAction {
    match snapshot.labels.get(LABEL_WATCH_ACTION).map(String::as_str) {
        Some("notify") => HealthAction::Notify,
        Some("restart") => HealthAction::Restart,
        _ => default,
    }
}
