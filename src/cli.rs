//! Command-line surface. Every flag overrides the corresponding field of a
//! [`WardenConfig`] already loaded from file/environment, so CLI flags sit
//! above file and environment in the precedence order.

use clap::{Parser, ValueEnum};

use crate::config::{HealthAction, Mode, WardenConfig};

#[derive(Debug, Parser)]
#[command(name = "dockwarden", about = "Container-fleet warden: digest-based update detection and health-driven restarts", version)]
pub struct Cli {
    /// Operating mode: full (update + watch), update-only, watch-only, or monitor (detect, never act).
    #[arg(long, value_enum)]
    pub mode: Option<CliMode>,

    /// Run a single update cycle and exit instead of looping.
    #[arg(long)]
    pub run_once: bool,

    /// Probe the engine once, print the result, and exit.
    #[arg(long)]
    pub health_check: bool,

    /// Docker engine socket or URL, e.g. unix:///var/run/docker.sock.
    #[arg(long)]
    pub docker_socket: Option<String>,

    /// Poll interval, e.g. "30s", "5m". Ignored when --cron-schedule is set.
    #[arg(long)]
    pub interval: Option<String>,

    /// Six-field cron expression; wins over --interval when present.
    #[arg(long)]
    pub cron_schedule: Option<String>,

    /// Remove the superseded image after a successful recreate.
    #[arg(long)]
    pub cleanup: bool,

    /// Never restart or recreate containers, regardless of what's detected.
    #[arg(long)]
    pub no_restart: bool,

    /// Never pull; only evaluate containers already present locally.
    #[arg(long)]
    pub no_pull: bool,

    /// Detect updates and log them without recreating anything.
    #[arg(long)]
    pub monitor_only: bool,

    /// Cap concurrent recreations at one, serializing the whole cycle.
    #[arg(long)]
    pub rolling_restart: bool,

    /// Only operate on containers carrying the enable label.
    #[arg(long)]
    pub label_enable: bool,

    /// Label key consulted when --label-enable is set.
    #[arg(long)]
    pub label_name: Option<String>,

    /// Only operate on containers whose `dockwarden.scope` label matches.
    #[arg(long)]
    pub scope: Option<String>,

    /// Also evaluate stopped containers, not just running ones.
    #[arg(long)]
    pub include_stopped: bool,

    /// Container names to exclude even if otherwise in scope. Repeatable.
    #[arg(long = "disable")]
    pub disable_containers: Vec<String>,

    /// This warden's own container name or id, excluded from every pass.
    #[arg(long)]
    pub self_identity: Option<String>,

    /// Disable the Health Watcher loop entirely.
    #[arg(long)]
    pub no_health_watch: bool,

    /// What the Health Watcher does on an unhealthy container by default.
    #[arg(long, value_enum)]
    pub health_action: Option<CliHealthAction>,

    /// Health Watcher tick cadence in seconds.
    #[arg(long)]
    pub health_tick_interval_secs: Option<u64>,

    /// Webhook URL for event notifications (Discord, Slack, or generic JSON).
    #[arg(long)]
    pub notification_url: Option<String>,

    /// Path to a docker-style `config.json` for registry auth.
    #[arg(long)]
    pub auth_config_path: Option<String>,

    /// Path to a TOML configuration file, takes precedence over $DOCKWARDEN_CONFIG_FILE.
    #[arg(long)]
    pub config_file: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliMode {
    Full,
    Update,
    Watch,
    Monitor,
}

impl From<CliMode> for Mode {
    fn from(m: CliMode) -> Self {
        match m {
            CliMode::Full => Mode::Full,
            CliMode::Update => Mode::Update,
            CliMode::Watch => Mode::Watch,
            CliMode::Monitor => Mode::Monitor,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliHealthAction {
    Restart,
    Notify,
}

impl From<CliHealthAction> for HealthAction {
    fn from(a: CliHealthAction) -> Self {
        match a {
            CliHealthAction::Restart => HealthAction::Restart,
            CliHealthAction::Notify => HealthAction::Notify,
        }
    }
}

impl Cli {
    /// Applies every flag the operator actually passed on top of an
    /// already file/env-loaded config. Booleans are one-directional (a flag
    /// can only turn its behavior on) since clap has no ergonomic way to
    /// distinguish "false" from "not passed" for plain switches.
    pub fn apply(self, config: &mut WardenConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if self.run_once {
            config.run_once = true;
        }
        if self.health_check {
            config.health_check_only = true;
        }
        if let Some(v) = self.docker_socket {
            config.docker_socket = v;
        }
        if let Some(v) = self.interval {
            config.interval = v;
        }
        if self.cron_schedule.is_some() {
            config.cron_schedule = self.cron_schedule;
        }
        if self.cleanup {
            config.cleanup = true;
        }
        if self.no_restart {
            config.no_restart = true;
        }
        if self.no_pull {
            config.no_pull = true;
        }
        if self.monitor_only {
            config.monitor_only = true;
        }
        if self.rolling_restart {
            config.rolling_restart = true;
        }
        if self.label_enable {
            config.label_enable = true;
        }
        if let Some(v) = self.label_name {
            config.label_name = v;
        }
        if let Some(v) = self.scope {
            config.scope = v;
        }
        if self.include_stopped {
            config.include_stopped = true;
        }
        if !self.disable_containers.is_empty() {
            config.disable_containers = self.disable_containers;
        }
        if self.self_identity.is_some() {
            config.self_identity = self.self_identity;
        }
        if self.no_health_watch {
            config.health_watch = false;
        }
        if let Some(action) = self.health_action {
            config.health_action = action.into();
        }
        if let Some(v) = self.health_tick_interval_secs {
            config.health_tick_interval_secs = v;
        }
        if self.notification_url.is_some() {
            config.notification_url = self.notification_url;
        }
        if self.auth_config_path.is_some() {
            config.auth_config_path = self.auth_config_path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn unset_flags_leave_config_defaults_untouched() {
        let cli = Cli::parse_from(["dockwarden"]);
        let mut config = WardenConfig::default();
        let before = config.clone();
        cli.apply(&mut config);
        assert_eq!(config.interval, before.interval);
        assert_eq!(config.mode, before.mode);
    }

    #[test]
    fn run_once_and_interval_flags_are_applied() {
        let cli = Cli::parse_from(["dockwarden", "--run-once", "--interval", "10s"]);
        let mut config = WardenConfig::default();
        cli.apply(&mut config);
        assert!(config.run_once);
        assert_eq!(config.interval, "10s");
    }

    #[test]
    fn repeated_disable_flags_collect_into_a_list() {
        let cli = Cli::parse_from(["dockwarden", "--disable", "a", "--disable", "b"]);
        let mut config = WardenConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.disable_containers, vec!["a".to_string(), "b".to_string()]);
    }
}
