//! Scheduler — drives the Updater's cadence, either a fixed interval or a
//! cron expression. Cron wins when both are configured; mirrors the
//! `tokio::time::interval` + `MissedTickBehavior::Skip` idiom used for the
//! Health Watcher's tick loop, generalized to also support cron ticks.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use tokio::time::MissedTickBehavior;

pub enum Cadence {
    Interval(Duration),
    Cron(Schedule),
}

impl Cadence {
    pub fn from_config(config: &crate::config::WardenConfig) -> Self {
        if let Some(expr) = &config.cron_schedule {
            let schedule = Schedule::from_str(expr).expect("validated at startup");
            Cadence::Cron(schedule)
        } else {
            Cadence::Interval(config.interval_duration().expect("validated at startup"))
        }
    }
}

/// Blocks until the next tick is due. For interval mode this is a plain
/// `tokio::time::interval` tick; for cron mode it computes the next
/// occurrence and sleeps until then.
pub struct Scheduler {
    cadence: Cadence,
    interval: Option<tokio::time::Interval>,
}

impl Scheduler {
    pub fn new(cadence: Cadence) -> Self {
        let interval = match &cadence {
            Cadence::Interval(d) => {
                let mut i = tokio::time::interval(*d);
                i.set_missed_tick_behavior(MissedTickBehavior::Skip);
                Some(i)
            }
            Cadence::Cron(_) => None,
        };
        Self { cadence, interval }
    }

    pub async fn tick(&mut self) {
        match &self.cadence {
            Cadence::Interval(_) => {
                self.interval.as_mut().expect("interval cadence always has an interval").tick().await;
            }
            Cadence::Cron(schedule) => {
                let now = Utc::now();
                if let Some(next) = schedule.after(&now).next() {
                    let delta = (next - now).to_std().unwrap_or(Duration::ZERO);
                    tokio::time::sleep(delta).await;
                } else {
                    tracing::warn!("cron schedule produced no upcoming occurrence, sleeping 1m");
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
            }
        }
    }
}
