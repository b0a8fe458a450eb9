//! `EngineOps` — object-safe interface over the container/image API.
//!
//! No policy lives here. Every domain module (Updater, Health Watcher) drives
//! the engine exclusively through this trait, so tests can substitute
//! [`super::fake::FakeEngine`] for a live [`super::client::DockerEngine`]
//! without a running daemon. Streaming-free, so every method is expressed as
//! a manually boxed future rather than via an `async-trait` macro.

use std::pin::Pin;

use crate::model::ContainerSnapshot;

use super::client::EngineError;

pub struct ListOpts {
    pub include_stopped: bool,
}

/// Captured state needed to recreate a container identity-preservingly.
pub struct RecreateSpec {
    pub name: String,
    pub config: bollard::models::ContainerCreateBody,
    pub networks: Vec<NetworkAttachment>,
}

pub struct NetworkAttachment {
    pub network_name: String,
    pub aliases: Vec<String>,
    pub ipv4_address: Option<String>,
    pub ipv6_address: Option<String>,
}

pub trait EngineOps: Send + Sync {
    /// Succeeds iff the engine answers within its own short deadline.
    fn ping(&self) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + '_>>;

    fn list(
        &self,
        opts: ListOpts,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<ContainerSnapshot>, EngineError>> + Send + '_>>;

    fn inspect<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerSnapshot, EngineError>> + Send + 'a>>;

    fn inspect_raw<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<bollard::models::ContainerInspectResponse, EngineError>> + Send + 'a>>;

    fn start<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>>;

    fn stop<'a>(
        &'a self,
        id: &'a str,
        timeout_secs: u32,
        signal: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>>;

    fn restart<'a>(
        &'a self,
        id: &'a str,
        timeout_secs: u32,
        signal: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>>;

    fn remove<'a>(
        &'a self,
        id: &'a str,
        remove_volumes: bool,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>>;

    /// Identity-preserving stop+remove+create+start. See `engine::recreate`.
    fn recreate<'a>(
        &'a self,
        id: &'a str,
        timeout_secs: u32,
        signal: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, EngineError>> + Send + 'a>>;

    fn pull<'a>(
        &'a self,
        image_ref: &'a str,
        auth: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>>;

    /// First repo digest (`name@algo:hex`) if present, else the local content id.
    fn image_digest<'a>(
        &'a self,
        image_ref: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, EngineError>> + Send + 'a>>;

    fn remove_image<'a>(
        &'a self,
        image_id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>>;
}
