//! Event schema emitted to the Notifier.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WardenEvent {
    ContainerUpdated {
        container_id: String,
        container_name: String,
        old_digest: String,
        new_digest: String,
        timestamp: DateTime<Utc>,
        message: String,
    },
    ContainerUnhealthy {
        container_id: String,
        container_name: String,
        restart_attempts: u32,
        timestamp: DateTime<Utc>,
        message: String,
    },
    ContainerGaveUp {
        container_id: String,
        container_name: String,
        max_attempts: u32,
        timestamp: DateTime<Utc>,
        message: String,
    },
    ContainerRestarted {
        container_id: String,
        container_name: String,
        timestamp: DateTime<Utc>,
        message: String,
    },
    UpdateCycleStart {
        timestamp: DateTime<Utc>,
        message: String,
    },
    UpdateCycleEnd {
        total_updated: u64,
        total_failed: u64,
        timestamp: DateTime<Utc>,
        message: String,
    },
}

impl WardenEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ContainerUpdated { .. } => "container_updated",
            Self::ContainerUnhealthy { .. } => "container_unhealthy",
            Self::ContainerGaveUp { .. } => "container_gave_up",
            Self::ContainerRestarted { .. } => "container_restarted",
            Self::UpdateCycleStart { .. } => "update_cycle_start",
            Self::UpdateCycleEnd { .. } => "update_cycle_end",
        }
    }
}
