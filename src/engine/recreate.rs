//! Identity-preserving in-place container recreate: stop → remove (preserve
//! volumes) → create (same name/config, every original network reattached,
//! fresh MAC) → start.

use bollard::models::ContainerCreateBody;
use bollard::query_parameters::CreateContainerOptions;

use super::client::{DockerEngine, EngineError};
use super::network::{build_networking_config, capture_attachments};
use super::ops::NetworkAttachment;

struct Captured {
    name: String,
    was_running: bool,
    config: ContainerCreateBody,
    networks: Vec<NetworkAttachment>,
}

impl DockerEngine {
    pub async fn recreate_impl(&self, id: &str, timeout_secs: u32, signal: Option<&str>) -> Result<String, EngineError> {
        let captured = self.capture(id).await.map_err(|e| wrap("inspect", e))?;

        if captured.was_running {
            self.stop_impl(id, timeout_secs, signal).await.map_err(|e| wrap("stop", e))?;
        }

        // Preserve volumes unconditionally: recreate is never a data-destructive
        // operation regardless of the updater's unrelated `cleanup` policy.
        self.remove_impl(id, false).await.map_err(|e| wrap("remove", e))?;

        let new_id = self.create_from_capture(&captured).await.map_err(|e| wrap("create", e))?;

        for attachment in captured.networks.iter().skip(1) {
            self.reattach_network(&new_id, attachment)
                .await
                .map_err(|e| wrap("reattach-network", e))?;
        }

        self.start_impl(&new_id).await.map_err(|e| wrap("start", e))?;

        Ok(new_id)
    }

    async fn capture(&self, id: &str) -> Result<Captured, EngineError> {
        let inspect = self.inspect_raw_impl(id).await?;

        let name = inspect
            .name
            .clone()
            .map(|n| n.trim_start_matches('/').to_string())
            .unwrap_or_default();

        let was_running = inspect
            .state
            .as_ref()
            .and_then(|s| s.running)
            .unwrap_or(false);

        let networks = capture_attachments(&inspect);

        let mut config = ContainerCreateBody {
            host_config: inspect.host_config.clone(),
            ..inspect_config_to_create_body(&inspect)
        };
        config.networking_config = Some(build_networking_config(&networks));

        Ok(Captured {
            name,
            was_running,
            config,
            networks,
        })
    }

    async fn create_from_capture(&self, captured: &Captured) -> Result<String, EngineError> {
        let options = Some(CreateContainerOptions {
            name: Some(captured.name.clone()),
            platform: None,
        });

        let response = self
            .client
            .create_container(options, captured.config.clone())
            .await?;

        Ok(response.id)
    }
}

fn inspect_config_to_create_body(inspect: &bollard::models::ContainerInspectResponse) -> ContainerCreateBody {
    let cfg = inspect.config.clone().unwrap_or_default();
    ContainerCreateBody {
        hostname: cfg.hostname,
        domainname: cfg.domainname,
        user: cfg.user,
        exposed_ports: cfg.exposed_ports,
        env: cfg.env,
        cmd: cfg.cmd,
        image: cfg.image,
        labels: cfg.labels,
        entrypoint: cfg.entrypoint,
        working_dir: cfg.working_dir,
        volumes: cfg.volumes,
        ..Default::default()
    }
}

fn wrap(step: &'static str, source: EngineError) -> EngineError {
    EngineError::RecreateFailed {
        step,
        source: Box::new(source),
    }
}
