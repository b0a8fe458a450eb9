//! Configuration surface — loaded from a TOML file and/or environment
//! variables. Priority: environment variables > config file > defaults,
//! the same precedence the grounding repo's `AgentConfig::load` implements.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Full,
    Update,
    Watch,
    Monitor,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Full
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthAction {
    Restart,
    Notify,
}

impl Default for HealthAction {
    fn default() -> Self {
        HealthAction::Restart
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub mode: Mode,
    pub docker_socket: String,
    pub run_once: bool,
    pub health_check_only: bool,

    /// Human-readable duration (`"30s"`, `"5m"`). Ignored if `cron_schedule` is set.
    pub interval: String,
    /// Seconds-granularity cron expression; wins over `interval` when present.
    pub cron_schedule: Option<String>,

    pub cleanup: bool,
    pub no_restart: bool,
    pub no_pull: bool,
    pub monitor_only: bool,
    pub rolling_restart: bool,
    pub stop_timeout_secs: u32,

    pub label_enable: bool,
    pub label_name: String,
    pub scope: String,
    pub include_stopped: bool,
    pub disable_containers: Vec<String>,
    pub self_identity: Option<String>,

    pub health_watch: bool,
    pub health_action: HealthAction,
    pub health_tick_interval_secs: u64,

    pub notification_url: Option<String>,
    pub auth_config_path: Option<String>,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            docker_socket: String::new(),
            run_once: false,
            health_check_only: false,
            interval: "5m".to_string(),
            cron_schedule: None,
            cleanup: false,
            no_restart: false,
            no_pull: false,
            monitor_only: false,
            rolling_restart: false,
            stop_timeout_secs: 10,
            label_enable: false,
            label_name: crate::model::snapshot::LABEL_ENABLE.to_string(),
            scope: String::new(),
            include_stopped: false,
            disable_containers: Vec::new(),
            self_identity: None,
            health_watch: true,
            health_action: HealthAction::default(),
            health_tick_interval_secs: 10,
            notification_url: None,
            auth_config_path: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, #[source] source: toml::de::Error },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl WardenConfig {
    /// Priority: environment variables > config file > defaults. `cli_path`,
    /// when given, is the operator's explicit `--config-file` flag and wins
    /// over `$DOCKWARDEN_CONFIG_FILE` and the built-in default path.
    pub fn load(cli_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_path = cli_path
            .map(str::to_string)
            .or_else(|| std::env::var("DOCKWARDEN_CONFIG_FILE").ok())
            .unwrap_or_else(|| "/etc/dockwarden/config.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!(path = %config_path, "loading configuration from file");
            Self::from_file(&config_path)?
        } else {
            tracing::info!(path = %config_path, "config file not found, using environment/defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DOCKWARDEN_DOCKER_SOCKET") {
            self.docker_socket = v;
        }
        if let Ok(v) = std::env::var("DOCKWARDEN_INTERVAL") {
            self.interval = v;
        }
        if let Ok(v) = std::env::var("DOCKWARDEN_CRON_SCHEDULE") {
            self.cron_schedule = Some(v);
        }
        if let Ok(v) = std::env::var("DOCKWARDEN_RUN_ONCE") {
            self.run_once = v.parse().unwrap_or(self.run_once);
        }
        if let Ok(v) = std::env::var("DOCKWARDEN_MONITOR_ONLY") {
            self.monitor_only = v.parse().unwrap_or(self.monitor_only);
        }
        if let Ok(v) = std::env::var("DOCKWARDEN_NOTIFICATION_URL") {
            self.notification_url = Some(v);
        }
        if let Ok(v) = std::env::var("DOCKWARDEN_SELF_IDENTITY") {
            self.self_identity = Some(v);
        }
    }

    /// Parses `interval` into a `Duration`. Fatal at startup if unparseable.
    pub fn interval_duration(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.interval)
            .map_err(|e| ConfigError::Invalid(format!("interval {:?}: {e}", self.interval)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_duration().is_err() && self.cron_schedule.is_none() {
            return Err(ConfigError::Invalid(format!(
                "interval {:?} is not a valid duration and no cron_schedule is set",
                self.interval
            )));
        }
        if let Some(expr) = &self.cron_schedule {
            expr.parse::<cron::Schedule>()
                .map_err(|e| ConfigError::Invalid(format!("cron_schedule {expr:?}: {e}")))?;
        }
        if self.label_enable && self.label_name.is_empty() {
            return Err(ConfigError::Invalid("label_name must not be empty when label_enable is set".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_cleanly() {
        assert!(WardenConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_interval_without_cron_is_rejected() {
        let mut config = WardenConfig::default();
        config.interval = "not-a-duration".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_interval_is_fine_when_cron_is_set() {
        let mut config = WardenConfig::default();
        config.interval = "not-a-duration".to_string();
        config.cron_schedule = Some("0 */5 * * * *".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_cron_expression_is_rejected() {
        let mut config = WardenConfig::default();
        config.cron_schedule = Some("not a cron expression".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn label_enable_requires_a_label_name() {
        let mut config = WardenConfig::default();
        config.label_enable = true;
        config.label_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn interval_duration_parses_human_readable_strings() {
        let mut config = WardenConfig::default();
        config.interval = "30s".to_string();
        assert_eq!(config.interval_duration().unwrap(), Duration::from_secs(30));
    }
}
