//! Data model shared across the update loop and the health loop.

pub mod events;
pub mod health_entry;
pub mod image_ref;
pub mod snapshot;
pub mod stats;
pub mod update_result;

pub use events::WardenEvent;
pub use health_entry::{HealthEntry, HealthState, UnhealthyOutcome, MAX_RESTART_ATTEMPTS};
pub use image_ref::ImageRef;
pub use snapshot::{ContainerSnapshot, ContainerState, HealthStatus};
pub use stats::{CycleStats, CycleStatsSnapshot, HealthStats, HealthStatsSnapshot};
pub use update_result::UpdateResult;
