//! Container View — immutable per-container snapshot with label-derived decisions.

use std::collections::HashMap;

use bollard::models::{ContainerInspectResponse, ContainerSummary};
use chrono::DateTime;

use super::image_ref::ImageRef;

pub const LABEL_ENABLE: &str = "dockwarden.enable";
pub const LABEL_UPDATE_ENABLE: &str = "dockwarden.update.enable";
pub const LABEL_WATCH_ENABLE: &str = "dockwarden.watch.enable";
pub const LABEL_SCOPE: &str = "dockwarden.scope";
pub const LABEL_STOP_TIMEOUT: &str = "dockwarden.stop-timeout";
pub const LABEL_STOP_SIGNAL: &str = "dockwarden.stop-signal";
pub const LABEL_WATCH_ACTION: &str = "dockwarden.watch.action";

const DEFAULT_STOP_SIGNAL: &str = "SIGTERM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Restarting,
    Paused,
    Exited,
    Dead,
    Removing,
    Other,
}

impl ContainerState {
    fn from_str(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "running" => Self::Running,
            "restarting" => Self::Restarting,
            "paused" => Self::Paused,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            "removing" => Self::Removing,
            _ => Self::Other,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Starting,
    None,
}

impl HealthStatus {
    fn from_str(s: Option<&str>) -> Self {
        match s {
            Some("healthy") => Self::Healthy,
            Some("unhealthy") => Self::Unhealthy,
            Some("starting") => Self::Starting,
            _ => Self::None,
        }
    }
}

/// Immutable view of one container as observed at list/inspect time.
#[derive(Debug, Clone)]
pub struct ContainerSnapshot {
    pub id: String,
    pub name: String,
    pub image: ImageRef,
    pub image_id: String,
    pub state: ContainerState,
    pub health: HealthStatus,
    pub labels: HashMap<String, String>,
    pub created_at: i64,
}

impl ContainerSnapshot {
    fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Whether `label_name` (the operator-configured enable label, default
    /// `dockwarden.enable`) is present with value `"true"`. Only consulted by
    /// the Filter when global label-enable mode is on.
    pub fn label_enabled(&self, label_name: &str) -> bool {
        self.label(label_name) == Some("true")
    }

    pub fn update_enabled(&self) -> bool {
        self.label(LABEL_UPDATE_ENABLE).map(|v| v != "false").unwrap_or(true)
    }

    pub fn watch_enabled(&self) -> bool {
        self.label(LABEL_WATCH_ENABLE).map(|v| v != "false").unwrap_or(true)
    }

    pub fn scope(&self) -> &str {
        self.label(LABEL_SCOPE).unwrap_or("")
    }

    /// Effective stop timeout in seconds: label override, else the supplied global default.
    pub fn stop_timeout(&self, global_default: u32) -> u32 {
        self.label(LABEL_STOP_TIMEOUT)
            .and_then(|v| v.parse().ok())
            .unwrap_or(global_default)
    }

    pub fn stop_signal(&self) -> &str {
        self.label(LABEL_STOP_SIGNAL).unwrap_or(DEFAULT_STOP_SIGNAL)
    }

    /// `restart` (default) or `notify`, per `dockwarden.watch.action`.
    pub fn watch_action(&self) -> &str {
        self.label(LABEL_WATCH_ACTION).unwrap_or("restart")
    }
}

impl From<ContainerSummary> for ContainerSnapshot {
    fn from(s: ContainerSummary) -> Self {
        let name = s
            .names
            .as_deref()
            .and_then(|n| n.first())
            .map(|n| n.trim_start_matches('/').to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let image_raw = s.image.unwrap_or_default();

        Self {
            id: s.id.unwrap_or_default(),
            name,
            image: ImageRef::parse(&image_raw),
            image_id: s.image_id.unwrap_or_default(),
            state: s
                .state
                .map(|st| ContainerState::from_str(&st.to_string()))
                .unwrap_or(ContainerState::Other),
            health: HealthStatus::None,
            labels: s.labels.unwrap_or_default(),
            created_at: s.created.unwrap_or_default(),
        }
    }
}

impl From<ContainerInspectResponse> for ContainerSnapshot {
    fn from(details: ContainerInspectResponse) -> Self {
        let name = details
            .name
            .map(|n| n.trim_start_matches('/').to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let created_at = details
            .created
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.timestamp())
            .unwrap_or(0);

        let state_str = details
            .state
            .as_ref()
            .and_then(|st| st.status.as_ref())
            .map(|st| st.to_string())
            .unwrap_or_default();

        // bollard reports health only inside the container's Health block; a
        // container without a healthcheck configured has no such field.
        let health_str = details
            .state
            .as_ref()
            .and_then(|st| st.health.as_ref())
            .and_then(|h| h.status.as_ref())
            .map(|s| s.to_string());

        Self {
            id: details.id.unwrap_or_default(),
            name,
            image: ImageRef::parse(&details.config.as_ref().and_then(|c| c.image.clone()).unwrap_or_default()),
            image_id: details.image.unwrap_or_default(),
            state: ContainerState::from_str(&state_str),
            health: HealthStatus::from_str(health_str.as_deref()),
            labels: details.config.and_then(|c| c.labels).unwrap_or_default(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_labels(labels: HashMap<String, String>) -> ContainerSnapshot {
        ContainerSnapshot {
            id: "abc123".into(),
            name: "web".into(),
            image: ImageRef::parse("nginx:latest"),
            image_id: "sha256:aaa".into(),
            state: ContainerState::Running,
            health: HealthStatus::None,
            labels,
            created_at: 0,
        }
    }

    #[test]
    fn defaults_when_no_labels_present() {
        let s = snapshot_with_labels(HashMap::new());
        assert!(s.update_enabled());
        assert!(s.watch_enabled());
        assert_eq!(s.scope(), "");
        assert_eq!(s.stop_signal(), "SIGTERM");
        assert_eq!(s.stop_timeout(30), 30);
        assert!(!s.label_enabled(LABEL_ENABLE));
    }

    #[test]
    fn update_enable_label_false_disables() {
        let mut labels = HashMap::new();
        labels.insert(LABEL_UPDATE_ENABLE.to_string(), "false".to_string());
        let s = snapshot_with_labels(labels);
        assert!(!s.update_enabled());
    }

    #[test]
    fn stop_timeout_label_overrides_default() {
        let mut labels = HashMap::new();
        labels.insert(LABEL_STOP_TIMEOUT.to_string(), "45".to_string());
        let s = snapshot_with_labels(labels);
        assert_eq!(s.stop_timeout(30), 45);
    }

    #[test]
    fn name_is_de_slashed_from_summary() {
        let summary = ContainerSummary {
            id: Some("id1".into()),
            names: Some(vec!["/web-1".into()]),
            image: Some("nginx:latest".into()),
            state: None,
            created: Some(1000),
            labels: None,
            ..Default::default()
        };
        let s = ContainerSnapshot::from(summary);
        assert_eq!(s.name, "web-1");
    }
}
