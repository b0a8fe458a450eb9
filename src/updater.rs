//! Updater — digest-based update detection and in-place recreation, with
//! bounded concurrency against the Engine Adapter.

use futures_util::stream::{self, StreamExt};

use crate::engine::ListOpts;
use crate::filter::{self, FilterPolicy};
use crate::model::{ContainerSnapshot, HealthEntry, UpdateResult, WardenEvent};
use crate::notifier::Notifier;
use crate::state::SharedState;

const DEFAULT_CONCURRENCY: usize = 5;

pub struct Updater {
    state: SharedState,
}

impl Updater {
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
            include_stopped: config.include_stopped,
            self_identity: config.self_identity.clone(),
        }
    }

    /// One invocation constitutes a cycle: list → filter → bounded fan-out →
    /// aggregate. Never aborts wholesale on a per-container failure.
    pub async fn run(&self, notifier: &Notifier) -> Vec<UpdateResult> {
        notifier.notify(WardenEvent::UpdateCycleStart {
            timestamp: chrono::Utc::now(),
            message: "update cycle starting".to_string(),
        });

        let list_opts = ListOpts { include_stopped: self.state.config.include_stopped };
        let snapshots = match self.state.engine.list(list_opts).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "update cycle aborted: engine list failed");
                return Vec::new();
            }
        };

        let policy = self.policy();
        let managed: Vec<ContainerSnapshot> = filter::apply(snapshots, &policy)
            .into_iter()
            .filter(|c| c.update_enabled())
            .collect();

        let concurrency = if self.state.config.rolling_restart { 1 } else { DEFAULT_CONCURRENCY };

        let results: Vec<UpdateResult> = stream::iter(managed)
            .map(|snapshot| update_one(&self.state, notifier, snapshot))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        for result in &results {
            if result.updated {
                self.state.cycle_stats.record_updated();
            } else if result.error.is_some() {
                self.state.cycle_stats.record_failed();
            }
        }
        self.state.cycle_stats.record_run_completed().await;

        let snapshot = self.state.cycle_stats.snapshot().await;
        notifier.notify(WardenEvent::UpdateCycleEnd {
            total_updated: snapshot.total_updated,
            total_failed: snapshot.total_failed,
            timestamp: chrono::Utc::now(),
            message: format!("cycle complete: {} updated, {} failed", snapshot.total_updated, snapshot.total_failed),
        });

        results
    }
}

/// The per-container update protocol (ordered): getDigest → pull → getDigest
/// → (maybe) recreate → (maybe) removeImage → resetHealth.
async fn update_one(state: &SharedState, notifier: &Notifier, snapshot: ContainerSnapshot) -> UpdateResult {
    let config = &state.config;
    let image_ref = snapshot.image.raw().to_string();

    if config.no_pull || snapshot.image.pinned() {
        return UpdateResult::unchanged(snapshot.id, snapshot.name, snapshot.image_id);
    }

    let current_digest = match state.engine.image_digest(&image_ref).await {
        Ok(d) => d,
        Err(e) => return UpdateResult::failed(snapshot.id, snapshot.name, snapshot.image_id, e),
    };

    let auth = state.auth.resolve(snapshot.image.registry());
    if let Err(e) = state.engine.pull(&image_ref, auth.as_deref()).await {
        tracing::warn!(container = %snapshot.name, error = %e, "pull failed");
        return UpdateResult::failed(snapshot.id, snapshot.name, snapshot.image_id, e);
    }

    let new_digest = match state.engine.image_digest(&image_ref).await {
        Ok(d) => d,
        Err(e) => return UpdateResult::failed(snapshot.id, snapshot.name, snapshot.image_id, e),
    };

    if current_digest == new_digest {
        return UpdateResult::unchanged(snapshot.id, snapshot.name, snapshot.image_id);
    }

    if config.monitor_only || matches!(config.mode, crate::config::Mode::Monitor) {
        tracing::info!(container = %snapshot.name, old = %current_digest, new = %new_digest, "update available (monitor-only)");
        return UpdateResult::unchanged(snapshot.id, snapshot.name, snapshot.image_id);
    }

    let old_image_id = snapshot.image_id.clone();
    let timeout = snapshot.stop_timeout(config.stop_timeout_secs);

    let new_id = match state.engine.recreate(&snapshot.id, timeout, Some(snapshot.stop_signal())).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(container = %snapshot.name, error = %e, "recreate failed");
            return UpdateResult::failed(snapshot.id, snapshot.name, old_image_id, e);
        }
    };

    if config.cleanup && !old_image_id.is_empty() {
        if let Err(e) = state.engine.remove_image(&old_image_id).await {
            tracing::debug!(image_id = %old_image_id, error = %e, "image cleanup failed, ignoring");
        }
    }

    // `new_digest` is in repo-digest/`image_digest()` format; HealthEntry and
    // UpdateResult track the bare content id instead, so re-inspect the
    // recreated container rather than reuse it.
    let new_image_id = match state.engine.inspect(&new_id).await {
        Ok(s) => s.image_id,
        Err(e) => {
            tracing::warn!(container = %snapshot.name, error = %e, "post-recreate inspect failed, falling back to the pulled digest");
            new_digest.clone()
        }
    };

    state.health.remove(&snapshot.id);
    state.health.insert(new_id.clone(), HealthEntry::new(new_image_id.clone()));

    notifier.notify(WardenEvent::ContainerUpdated {
        container_id: new_id.clone(),
        container_name: snapshot.name.clone(),
        old_digest: current_digest,
        new_digest,
        timestamp: chrono::Utc::now(),
        message: format!("{} updated", snapshot.name),
    });

    UpdateResult::updated(new_id, snapshot.name, old_image_id, new_image_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WardenConfig;
    use crate::engine::FakeEngine;
    use crate::model::{ContainerState, HealthStatus, ImageRef};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn snapshot(id: &str, name: &str, image: &str, image_id: &str) -> ContainerSnapshot {
        ContainerSnapshot {
            id: id.to_string(),
            name: name.to_string(),
            image: ImageRef::parse(image),
            image_id: image_id.to_string(),
            state: ContainerState::Running,
            health: HealthStatus::None,
            labels: HashMap::new(),
            created_at: 0,
        }
    }

    fn state_with(engine: Arc<FakeEngine>, config: WardenConfig) -> SharedState {
        Arc::new(crate::state::WardenState::new(engine, config))
    }

    #[tokio::test]
    async fn no_change_produces_zero_updates() {
        let engine = Arc::new(FakeEngine::new());
        engine.seed_container(snapshot("c1", "nginx", "nginx:latest", "sha256:A"), true).await;
        let state = state_with(engine, WardenConfig::default());

        let notifier = Notifier::new(None);
        let results = Updater::new(state).run(&notifier).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].updated);
        assert!(results[0].error.is_none());
    }

    #[tokio::test]
    async fn upstream_change_triggers_recreate() {
        let engine = Arc::new(FakeEngine::new());
        engine.seed_container(snapshot("c1", "api", "api:latest", "sha256:A"), true).await;
        engine.set_remote_digest("api:latest", "sha256:B").await;
        let state = state_with(engine, WardenConfig::default());

        let notifier = Notifier::new(None);
        let results = Updater::new(state.clone()).run(&notifier).await;

        assert_eq!(results.len(), 1);
        assert!(results[0].updated);
        assert_eq!(results[0].new_image_id, "sha256:B");
        assert!(state.health.contains_key(&results[0].container_id));
    }

    #[tokio::test]
    async fn pinned_tag_is_never_pulled() {
        let engine = Arc::new(FakeEngine::new());
        engine.seed_container(snapshot("c1", "db", "postgres:15.3", "sha256:P"), true).await;
        let state = state_with(engine.clone(), WardenConfig::default());

        let notifier = Notifier::new(None);
        let results = Updater::new(state).run(&notifier).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].updated);
        assert_eq!(engine.pull_call_count().await, 0);
    }

    #[tokio::test]
    async fn monitor_only_never_recreates() {
        let engine = Arc::new(FakeEngine::new());
        engine.seed_container(snapshot("c1", "api", "api:latest", "sha256:A"), true).await;
        engine.set_remote_digest("api:latest", "sha256:B").await;

        let mut config = WardenConfig::default();
        config.monitor_only = true;
        let state = state_with(engine.clone(), config);

        let notifier = Notifier::new(None);
        let results = Updater::new(state.clone()).run(&notifier).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].updated);
        assert_eq!(engine.recreate_call_count().await, 0);
        assert_eq!(state.cycle_stats.snapshot().await.total_updated, 0);
    }

    #[tokio::test]
    async fn rolling_restart_still_updates_every_container() {
        let engine = Arc::new(FakeEngine::new());
        for i in 0..3 {
            let id = format!("c{i}");
            let name = format!("svc{i}");
            engine.seed_container(snapshot(&id, &name, "app:latest", "sha256:A"), true).await;
        }
        engine.set_remote_digest("app:latest", "sha256:B").await;

        let mut config = WardenConfig::default();
        config.rolling_restart = true;
        let state = state_with(engine, config);

        let notifier = Notifier::new(None);
        let results = Updater::new(state).run(&notifier).await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.updated));
    }

    #[tokio::test]
    async fn no_pull_mode_skips_every_container() {
        let engine = Arc::new(FakeEngine::new());
        engine.seed_container(snapshot("c1", "api", "api:latest", "sha256:A"), true).await;
        engine.set_remote_digest("api:latest", "sha256:B").await;

        let mut config = WardenConfig::default();
        config.no_pull = true;
        let state = state_with(engine.clone(), config);

        let notifier = Notifier::new(None);
        let results = Updater::new(state).run(&notifier).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].updated);
        assert_eq!(engine.pull_call_count().await, 0);
    }
}
