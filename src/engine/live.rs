//! Wires [`DockerEngine`]'s concrete `*_impl` methods (container.rs, image.rs,
//! recreate.rs) up to the [`EngineOps`] trait object.

use std::pin::Pin;

use crate::model::ContainerSnapshot;

use super::client::{DockerEngine, EngineError};
use super::ops::{EngineOps, ListOpts};

impl EngineOps for DockerEngine {
    fn ping(&self) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + '_>> {
        Box::pin(self.ping_impl())
    }

    fn list(
        &self,
        opts: ListOpts,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<ContainerSnapshot>, EngineError>> + Send + '_>> {
        Box::pin(self.list_impl(opts))
    }

    fn inspect<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerSnapshot, EngineError>> + Send + 'a>> {
        Box::pin(self.inspect_impl(id))
    }

    fn inspect_raw<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<bollard::models::ContainerInspectResponse, EngineError>> + Send + 'a>> {
        Box::pin(self.inspect_raw_impl(id))
    }

    fn start<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(self.start_impl(id))
    }

    fn stop<'a>(
        &'a self,
        id: &'a str,
        timeout_secs: u32,
        signal: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(self.stop_impl(id, timeout_secs, signal))
    }

    fn restart<'a>(
        &'a self,
        id: &'a str,
        timeout_secs: u32,
        signal: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(self.restart_impl(id, timeout_secs, signal))
    }

    fn remove<'a>(
        &'a self,
        id: &'a str,
        remove_volumes: bool,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(self.remove_impl(id, remove_volumes))
    }

    fn recreate<'a>(
        &'a self,
        id: &'a str,
        timeout_secs: u32,
        signal: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, EngineError>> + Send + 'a>> {
        Box::pin(self.recreate_impl(id, timeout_secs, signal))
    }

    fn pull<'a>(
        &'a self,
        image_ref: &'a str,
        auth: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(self.pull_impl(image_ref, auth))
    }

    fn image_digest<'a>(
        &'a self,
        image_ref: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, EngineError>> + Send + 'a>> {
        Box::pin(self.image_digest_impl(image_ref))
    }

    fn remove_image<'a>(
        &'a self,
        image_id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(self.remove_image_impl(image_id))
    }
}
