//! Filter — reduces a snapshot set to the managed set using policy.
//!
//! Order is preserved; rules are evaluated in the order given in the spec,
//! and the first failing rule drops the container.

use crate::model::ContainerSnapshot;

#[derive(Debug, Clone, Default)]
pub struct FilterPolicy {
    pub label_enable: bool,
    pub label_name: String,
    pub scope: String,
    pub disable_list: Vec<String>,
    pub include_stopped: bool,
    /// The operator-supplied self-identity hint (name or container id derived
    /// from `/proc/self/cgroup`); `None` disables self-protection entirely.
    pub self_identity: Option<String>,
}

pub fn apply(snapshots: Vec<ContainerSnapshot>, policy: &FilterPolicy) -> Vec<ContainerSnapshot> {
    snapshots
        .into_iter()
        .filter(|s| passes(s, policy))
        .collect()
}

fn passes(snapshot: &ContainerSnapshot, policy: &FilterPolicy) -> bool {
    if policy.disable_list.iter().any(|name| name == &snapshot.name) {
        return false;
    }

    if policy.label_enable && !snapshot.label_enabled(&policy.label_name) {
        return false;
    }

    if !policy.scope.is_empty() && snapshot.scope() != policy.scope {
        return false;
    }

    if !policy.include_stopped && !snapshot.state.is_running() {
        return false;
    }

    if let Some(self_id) = &policy.self_identity {
        if &snapshot.name == self_id || &snapshot.id == self_id {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContainerState, HealthStatus, ImageRef};
    use std::collections::HashMap;

    fn container(name: &str, running: bool, labels: HashMap<String, String>) -> ContainerSnapshot {
        ContainerSnapshot {
            id: format!("id-{name}"),
            name: name.to_string(),
            image: ImageRef::parse("nginx:latest"),
            image_id: "sha256:a".to_string(),
            state: if running { ContainerState::Running } else { ContainerState::Exited },
            health: HealthStatus::None,
            labels,
            created_at: 0,
        }
    }

    #[test]
    fn drops_stopped_containers_by_default() {
        let policy = FilterPolicy::default();
        let result = apply(vec![container("a", false, HashMap::new())], &policy);
        assert!(result.is_empty());
    }

    #[test]
    fn include_stopped_keeps_them() {
        let policy = FilterPolicy { include_stopped: true, ..Default::default() };
        let result = apply(vec![container("a", false, HashMap::new())], &policy);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn disable_list_drops_by_exact_name() {
        let policy = FilterPolicy {
            disable_list: vec!["a".to_string()],
            ..Default::default()
        };
        let result = apply(vec![container("a", true, HashMap::new()), container("b", true, HashMap::new())], &policy);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "b");
    }

    #[test]
    fn label_enable_mode_requires_true_label() {
        let policy = FilterPolicy { label_enable: true, ..Default::default() };
        let mut labels = HashMap::new();
        labels.insert("dockwarden.enable".to_string(), "true".to_string());
        let result = apply(
            vec![container("a", true, labels), container("b", true, HashMap::new())],
            &policy,
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "a");
    }

    #[test]
    fn scope_mismatch_is_dropped() {
        let policy = FilterPolicy { scope: "prod".to_string(), ..Default::default() };
        let mut labels = HashMap::new();
        labels.insert("dockwarden.scope".to_string(), "staging".to_string());
        let result = apply(vec![container("a", true, labels)], &policy);
        assert!(result.is_empty());
    }

    #[test]
    fn self_protection_excludes_own_container_by_name() {
        let policy = FilterPolicy {
            self_identity: Some("dockwarden".to_string()),
            ..Default::default()
        };
        let result = apply(vec![container("dockwarden", true, HashMap::new())], &policy);
        assert!(result.is_empty());
    }

    #[test]
    fn no_self_identity_applies_no_self_exclusion() {
        let policy = FilterPolicy::default();
        let result = apply(vec![container("dockwarden", true, HashMap::new())], &policy);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn order_is_preserved() {
        let policy = FilterPolicy::default();
        let result = apply(
            vec![container("b", true, HashMap::new()), container("a", true, HashMap::new())],
            &policy,
        );
        assert_eq!(result[0].name, "b");
        assert_eq!(result[1].name, "a");
    }
}
