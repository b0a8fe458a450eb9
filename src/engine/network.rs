//! Network endpoint capture and reattachment, used by the recreate protocol.

use std::collections::HashMap;

use bollard::models::{ContainerInspectResponse, EndpointSettings, NetworkConnectRequest, NetworkingConfig};

use super::client::{DockerEngine, EngineError};
use super::ops::NetworkAttachment;

/// Captures the endpoint configuration of every network the container was
/// attached to at inspect time. Aliases and static IPs are preserved; the
/// MAC address is deliberately dropped so the recreated container obtains a
/// fresh one (stale DNS on some daemons is cached against the old MAC).
pub fn capture_attachments(inspect: &ContainerInspectResponse) -> Vec<NetworkAttachment> {
    inspect
        .network_settings
        .as_ref()
        .and_then(|ns| ns.networks.as_ref())
        .map(|networks| {
            networks
                .iter()
                .map(|(name, settings)| NetworkAttachment {
                    network_name: name.clone(),
                    aliases: settings.aliases.clone().unwrap_or_default(),
                    ipv4_address: non_empty(settings.ip_address.clone()),
                    ipv6_address: non_empty(settings.global_ipv6_address.clone()),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.is_empty())
}

/// Builds the `NetworkingConfig` for container creation from captured
/// attachments. The primary (first) network can be attached at create time;
/// bollard only allows one network in `NetworkingConfig`, so callers must
/// `network_connect` the remainder after `start`.
pub fn build_networking_config(attachments: &[NetworkAttachment]) -> NetworkingConfig {
    let mut endpoints = HashMap::new();
    if let Some(primary) = attachments.first() {
        endpoints.insert(primary.network_name.clone(), endpoint_settings(primary));
    }
    NetworkingConfig {
        endpoints_config: Some(endpoints),
    }
}

fn endpoint_settings(attachment: &NetworkAttachment) -> EndpointSettings {
    EndpointSettings {
        aliases: Some(attachment.aliases.clone()),
        ipam_config: None,
        ip_address: attachment.ipv4_address.clone(),
        global_ipv6_address: attachment.ipv6_address.clone(),
        mac_address: None,
        ..Default::default()
    }
}

impl DockerEngine {
    /// Attaches `container_id` to `attachment`'s network with its captured
    /// aliases/static IPs. Used to reattach every network beyond the primary
    /// one handled at container-create time.
    pub async fn reattach_network(
        &self,
        container_id: &str,
        attachment: &NetworkAttachment,
    ) -> Result<(), EngineError> {
        let config = NetworkConnectRequest {
            container: container_id.to_string(),
            endpoint_config: Some(endpoint_settings(attachment)),
        };
        self.client
            .connect_network(&attachment.network_name, config)
            .await
            .map_err(EngineError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str) -> NetworkAttachment {
        NetworkAttachment {
            network_name: name.to_string(),
            aliases: vec!["web".to_string()],
            ipv4_address: Some("172.18.0.5".to_string()),
            ipv6_address: None,
        }
    }

    #[test]
    fn networking_config_carries_only_the_primary_network() {
        let attachments = vec![attachment("app-net"), attachment("db-net")];
        let config = build_networking_config(&attachments);
        let endpoints = config.endpoints_config.unwrap();
        assert_eq!(endpoints.len(), 1);
        assert!(endpoints.contains_key("app-net"));
    }

    #[test]
    fn endpoint_settings_never_carry_a_mac_address() {
        let settings = endpoint_settings(&attachment("app-net"));
        assert!(settings.mac_address.is_none());
        assert_eq!(settings.ip_address.as_deref(), Some("172.18.0.5"));
    }
}
