//! Fake — deterministic in-memory test double for [`EngineOps`].
//!
//! Gated behind the `test-support` feature so integration tests and other
//! crates can depend on it without pulling a real `bollard::Docker` handle.

use std::collections::HashMap;
use std::pin::Pin;

use tokio::sync::Mutex;

use crate::model::ContainerSnapshot;

use super::client::EngineError;
use super::ops::{EngineOps, ListOpts};

#[derive(Clone)]
struct FakeContainer {
    snapshot: ContainerSnapshot,
    running: bool,
}

#[derive(Default)]
struct Inner {
    containers: HashMap<String, FakeContainer>,
    /// image ref → digest currently considered "pulled locally" for that ref.
    local_digests: HashMap<String, String>,
    /// image ref → digest the (simulated) registry would serve on next pull.
    remote_digests: HashMap<String, String>,
    pull_calls: Vec<String>,
    recreate_calls: Vec<String>,
    restart_calls: Vec<String>,
    next_recreate_id: u64,
}

/// A fake engine for deterministic testing. All seed methods are async to
/// match the shape of a real adapter's methods, even though the in-memory
/// mutex never actually contends.
pub struct FakeEngine {
    inner: Mutex<Inner>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    pub async fn seed_container(&self, snapshot: ContainerSnapshot, running: bool) {
        let mut state = self.inner.lock().await;
        let image_ref = snapshot.image.raw().to_string();
        let image_id = snapshot.image_id.clone();
        state.local_digests.entry(image_ref).or_insert(image_id);
        state.containers.insert(snapshot.id.clone(), FakeContainer { snapshot, running });
    }

    /// Sets what the next `pull` of `image_ref` will observe as available.
    pub async fn set_remote_digest(&self, image_ref: &str, digest: &str) {
        self.inner.lock().await.remote_digests.insert(image_ref.to_string(), digest.to_string());
    }

    pub async fn pull_call_count(&self) -> usize {
        self.inner.lock().await.pull_calls.len()
    }

    pub async fn recreate_call_count(&self) -> usize {
        self.inner.lock().await.recreate_calls.len()
    }

    pub async fn restart_call_count(&self, id: &str) -> usize {
        self.inner.lock().await.restart_calls.iter().filter(|c| c.as_str() == id).count()
    }

    pub async fn current_image_id(&self, container_id: &str) -> Option<String> {
        self.inner.lock().await.containers.get(container_id).map(|c| c.snapshot.image_id.clone())
    }
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineOps for FakeEngine {
    fn ping(&self) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }

    fn list(
        &self,
        opts: ListOpts,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<ContainerSnapshot>, EngineError>> + Send + '_>> {
        Box::pin(async move {
            let state = self.inner.lock().await;
            Ok(state
                .containers
                .values()
                .filter(|c| opts.include_stopped || c.running)
                .map(|c| c.snapshot.clone())
                .collect())
        })
    }

    fn inspect<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerSnapshot, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let state = self.inner.lock().await;
            state
                .containers
                .get(id)
                .map(|c| c.snapshot.clone())
                .ok_or_else(|| EngineError::ContainerNotFound(id.to_string()))
        })
    }

    fn inspect_raw<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<bollard::models::ContainerInspectResponse, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let state = self.inner.lock().await;
            if state.containers.contains_key(id) {
                Ok(bollard::models::ContainerInspectResponse {
                    id: Some(id.to_string()),
                    ..Default::default()
                })
            } else {
                Err(EngineError::ContainerNotFound(id.to_string()))
            }
        })
    }

    fn start<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            match state.containers.get_mut(id) {
                Some(c) => {
                    c.running = true;
                    Ok(())
                }
                None => Err(EngineError::ContainerNotFound(id.to_string())),
            }
        })
    }

    fn stop<'a>(
        &'a self,
        id: &'a str,
        _timeout_secs: u32,
        _signal: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            match state.containers.get_mut(id) {
                Some(c) => {
                    c.running = false;
                    Ok(())
                }
                None => Err(EngineError::ContainerNotFound(id.to_string())),
            }
        })
    }

    fn restart<'a>(
        &'a self,
        id: &'a str,
        _timeout_secs: u32,
        _signal: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            state.restart_calls.push(id.to_string());
            match state.containers.get_mut(id) {
                Some(c) => {
                    c.running = true;
                    Ok(())
                }
                None => Err(EngineError::ContainerNotFound(id.to_string())),
            }
        })
    }

    fn remove<'a>(
        &'a self,
        id: &'a str,
        _remove_volumes: bool,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            state
                .containers
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| EngineError::ContainerNotFound(id.to_string()))
        })
    }

    fn recreate<'a>(
        &'a self,
        id: &'a str,
        _timeout_secs: u32,
        _signal: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            state.recreate_calls.push(id.to_string());

            let mut container = state
                .containers
                .remove(id)
                .ok_or_else(|| EngineError::ContainerNotFound(id.to_string()))?;

            state.next_recreate_id += 1;
            let new_id = format!("{id}-recreated-{}", state.next_recreate_id);

            let image_ref = container.snapshot.image.raw().to_string();
            if let Some(digest) = state.local_digests.get(&image_ref).cloned() {
                container.snapshot.image_id = digest;
            }
            container.snapshot.id = new_id.clone();
            container.running = true;

            state.containers.insert(new_id.clone(), container);
            Ok(new_id)
        })
    }

    fn pull<'a>(
        &'a self,
        image_ref: &'a str,
        _auth: Option<&'a str>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            state.pull_calls.push(image_ref.to_string());
            if let Some(remote) = state.remote_digests.get(image_ref).cloned() {
                state.local_digests.insert(image_ref.to_string(), remote);
            }
            Ok(())
        })
    }

    fn image_digest<'a>(
        &'a self,
        image_ref: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let state = self.inner.lock().await;
            Ok(state
                .local_digests
                .get(image_ref)
                .cloned()
                .unwrap_or_else(|| format!("sha256:{image_ref}-initial")))
        })
    }

    fn remove_image<'a>(
        &'a self,
        _image_id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContainerState, HealthStatus, ImageRef};
    use std::collections::HashMap as StdHashMap;

    fn snapshot(id: &str, name: &str, image: &str, image_id: &str) -> ContainerSnapshot {
        ContainerSnapshot {
            id: id.to_string(),
            name: name.to_string(),
            image: ImageRef::parse(image),
            image_id: image_id.to_string(),
            state: ContainerState::Running,
            health: HealthStatus::None,
            labels: StdHashMap::new(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn pull_adopts_the_remote_digest() {
        let engine = FakeEngine::new();
        engine.seed_container(snapshot("c1", "api", "api:latest", "sha256:A"), true).await;
        engine.set_remote_digest("api:latest", "sha256:B").await;

        assert_eq!(engine.image_digest("api:latest").await.unwrap(), "sha256:A");
        engine.pull("api:latest", None).await.unwrap();
        assert_eq!(engine.image_digest("api:latest").await.unwrap(), "sha256:B");
    }

    #[tokio::test]
    async fn recreate_assigns_a_new_id_and_keeps_it_running() {
        let engine = FakeEngine::new();
        engine.seed_container(snapshot("c1", "api", "api:latest", "sha256:A"), true).await;

        let new_id = engine.recreate("c1", 10, None).await.unwrap();
        assert_ne!(new_id, "c1");
        assert!(engine.inspect(&new_id).await.is_ok());
        assert!(engine.inspect("c1").await.is_err());
    }
}
