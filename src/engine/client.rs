//! Engine client — core struct, constructor, error types.
//!
//! Operation impls live in sibling modules (`container`, `image`, `network`,
//! `recreate`) which add `impl DockerEngine` blocks, mirroring the source this
//! was grown from.

use bollard::Docker;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine connection failed: {0}")]
    ConnectionFailed(String),
    #[error("container not found: {0}")]
    ContainerNotFound(String),
    #[error("engine unreachable within deadline")]
    Unreachable,
    #[error("pull failed: {0}")]
    PullFailed(String),
    #[error("recreate failed at step '{step}': {source}")]
    RecreateFailed {
        step: &'static str,
        #[source]
        source: Box<EngineError>,
    },
    #[error("bollard error: {0}")]
    Bollard(#[from] bollard::errors::Error),
}

#[derive(Debug, Clone)]
pub struct DockerEngine {
    pub(super) client: Docker,
}

impl DockerEngine {
    /// Connects using `socket_path`, or the daemon default when empty.
    pub fn new(socket_path: &str) -> Result<Self, EngineError> {
        let client = if socket_path.is_empty() {
            Docker::connect_with_local_defaults()
                .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?
        } else {
            let clean_path = socket_path.trim_start_matches("unix://");
            Docker::connect_with_socket(clean_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?
        };

        Ok(Self { client })
    }

    pub fn from_bollard(client: Docker) -> Self {
        Self { client }
    }
}

pub(super) fn map_not_found(id: &str, err: bollard::errors::Error) -> EngineError {
    match err {
        bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
            EngineError::ContainerNotFound(id.to_string())
        }
        other => EngineError::Bollard(other),
    }
}
