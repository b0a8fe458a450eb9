//! Shared application state owned by the Supervisor.

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::WardenConfig;
use crate::engine::{AuthResolver, EngineOps};
use crate::model::{CycleStats, HealthEntry, HealthStats};

pub struct WardenState {
    /// Per-container retry state machine, keyed by container id. DashMap's
    /// sharded locking gives map-level concurrency with per-entry exclusivity
    /// without a second lock type.
    pub health: DashMap<String, HealthEntry>,
    pub cycle_stats: CycleStats,
    pub health_stats: HealthStats,
    pub engine: Arc<dyn EngineOps>,
    pub auth: AuthResolver,
    pub config: WardenConfig,
}

impl WardenState {
    pub fn new(engine: Arc<dyn EngineOps>, config: WardenConfig) -> Self {
        let auth = AuthResolver::new(config.auth_config_path.as_deref(), std::env::var("HOME").ok().as_deref());
        Self {
            health: DashMap::new(),
            cycle_stats: CycleStats::new(),
            health_stats: HealthStats::new(),
            engine,
            auth,
            config,
        }
    }
}

pub type SharedState = Arc<WardenState>;
