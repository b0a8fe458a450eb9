//! Health Watcher per-container state machine.

pub const MAX_RESTART_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Nominal,
    Degraded(u32),
    GaveUp,
}

/// Per-container mutable retry state, keyed by container id in the registry.
#[derive(Debug, Clone)]
pub struct HealthEntry {
    pub state: HealthState,
    pub last_image_id: String,
}

impl HealthEntry {
    pub fn new(image_id: impl Into<String>) -> Self {
        Self {
            state: HealthState::Nominal,
            last_image_id: image_id.into(),
        }
    }

    pub fn attempts(&self) -> u32 {
        match self.state {
            HealthState::Degraded(k) => k,
            _ => 0,
        }
    }

    pub fn gave_up(&self) -> bool {
        matches!(self.state, HealthState::GaveUp)
    }

    /// Resets to Nominal in place; used on identity-preserving recreate and on
    /// image-id drift observed by the watcher itself.
    pub fn reset(&mut self, image_id: impl Into<String>) {
        self.state = HealthState::Nominal;
        self.last_image_id = image_id.into();
    }

    /// Applies the pre-step version-reset check. Returns true if a reset occurred.
    pub fn maybe_version_reset(&mut self, current_image_id: &str) -> bool {
        if !self.last_image_id.is_empty() && self.last_image_id != current_image_id {
            self.reset(current_image_id.to_string());
            true
        } else {
            self.last_image_id = current_image_id.to_string();
            false
        }
    }

    /// Outcome of one tick given the observed health. Mutates state, returns
    /// what the caller should do: issue a restart, emit an event, or nothing.
    pub fn on_unhealthy(&mut self) -> UnhealthyOutcome {
        if self.gave_up() {
            return UnhealthyOutcome::AlreadyGaveUp;
        }
        let attempts = self.attempts() + 1;
        if attempts > MAX_RESTART_ATTEMPTS {
            self.state = HealthState::GaveUp;
            UnhealthyOutcome::GaveUp
        } else {
            self.state = HealthState::Degraded(attempts);
            UnhealthyOutcome::ShouldRestart(attempts)
        }
    }

    pub fn on_healthy(&mut self) -> bool {
        if self.gave_up() {
            return false;
        }
        let was_degraded = self.attempts() > 0;
        self.state = HealthState::Nominal;
        was_degraded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhealthyOutcome {
    ShouldRestart(u32),
    GaveUp,
    AlreadyGaveUp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gives_up_after_max_attempts() {
        let mut e = HealthEntry::new("sha256:a");
        for i in 1..=MAX_RESTART_ATTEMPTS {
            let outcome = e.on_unhealthy();
            assert_eq!(outcome, UnhealthyOutcome::ShouldRestart(i));
        }
        assert_eq!(e.on_unhealthy(), UnhealthyOutcome::GaveUp);
        assert!(e.gave_up());
        assert_eq!(e.on_unhealthy(), UnhealthyOutcome::AlreadyGaveUp);
    }

    #[test]
    fn healthy_resets_attempts() {
        let mut e = HealthEntry::new("sha256:a");
        e.on_unhealthy();
        e.on_unhealthy();
        assert_eq!(e.attempts(), 2);
        assert!(e.on_healthy());
        assert_eq!(e.attempts(), 0);
    }

    #[test]
    fn version_change_exits_gave_up() {
        let mut e = HealthEntry::new("sha256:a");
        for _ in 0..=MAX_RESTART_ATTEMPTS {
            e.on_unhealthy();
        }
        assert!(e.gave_up());
        assert!(e.maybe_version_reset("sha256:b"));
        assert!(!e.gave_up());
        assert_eq!(e.attempts(), 0);
    }

    #[test]
    fn same_version_does_not_reset() {
        let mut e = HealthEntry::new("sha256:a");
        e.on_unhealthy();
        assert!(!e.maybe_version_reset("sha256:a"));
        assert_eq!(e.attempts(), 1);
    }

    #[test]
    fn no_restart_call_while_gave_up() {
        let mut e = HealthEntry::new("sha256:a");
        for _ in 0..=MAX_RESTART_ATTEMPTS {
            e.on_unhealthy();
        }
        // further unhealthy ticks with the same image id never issue a restart
        assert_eq!(e.on_unhealthy(), UnhealthyOutcome::AlreadyGaveUp);
        assert_eq!(e.on_unhealthy(), UnhealthyOutcome::AlreadyGaveUp);
    }
}
