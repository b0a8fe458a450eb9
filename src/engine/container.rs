//! Container domain — list, inspect, lifecycle, ping.

use bollard::models::ContainerInspectResponse;
use bollard::query_parameters::{
    ListContainersOptions, RemoveContainerOptions, RestartContainerOptions, StopContainerOptions,
};
use tokio::time::{timeout, Duration};

use crate::model::ContainerSnapshot;

use super::client::{map_not_found, DockerEngine, EngineError};
use super::ops::ListOpts;

const PING_DEADLINE: Duration = Duration::from_secs(5);

impl DockerEngine {
    pub async fn ping_impl(&self) -> Result<(), EngineError> {
        match timeout(PING_DEADLINE, self.client.ping()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(EngineError::Bollard(e)),
            Err(_) => Err(EngineError::Unreachable),
        }
    }

    pub async fn list_impl(&self, opts: ListOpts) -> Result<Vec<ContainerSnapshot>, EngineError> {
        let options = Some(ListContainersOptions {
            all: opts.include_stopped,
            ..Default::default()
        });
        let containers = self.client.list_containers(options).await?;
        Ok(containers.into_iter().map(ContainerSnapshot::from).collect())
    }

    pub async fn inspect_impl(&self, id: &str) -> Result<ContainerSnapshot, EngineError> {
        let details = self.inspect_raw_impl(id).await?;
        Ok(ContainerSnapshot::from(details))
    }

    pub async fn inspect_raw_impl(&self, id: &str) -> Result<ContainerInspectResponse, EngineError> {
        self.client
            .inspect_container(id, None)
            .await
            .map_err(|e| map_not_found(id, e))
    }

    pub async fn start_impl(&self, id: &str) -> Result<(), EngineError> {
        self.client
            .start_container(id, None)
            .await
            .map_err(|e| map_not_found(id, e))
    }

    pub async fn stop_impl(&self, id: &str, timeout_secs: u32, signal: Option<&str>) -> Result<(), EngineError> {
        let options = Some(StopContainerOptions {
            t: Some(timeout_secs as i32),
            signal: signal.map(str::to_string),
            ..Default::default()
        });
        self.client
            .stop_container(id, options)
            .await
            .map_err(|e| map_not_found(id, e))
    }

    pub async fn restart_impl(&self, id: &str, timeout_secs: u32, signal: Option<&str>) -> Result<(), EngineError> {
        let options = Some(RestartContainerOptions {
            t: Some(timeout_secs as i32),
            signal: signal.map(str::to_string),
            ..Default::default()
        });
        self.client
            .restart_container(id, options)
            .await
            .map_err(|e| map_not_found(id, e))
    }

    pub async fn remove_impl(&self, id: &str, remove_volumes: bool) -> Result<(), EngineError> {
        let options = Some(RemoveContainerOptions {
            force: true,
            v: remove_volumes,
            ..Default::default()
        });
        self.client
            .remove_container(id, options)
            .await
            .map_err(|e| map_not_found(id, e))
    }
}
