//! Engine Adapter — thin, typed interface over the container/image API.
//! No policy lives here; see `filter`, `updater`, and `health` for that.

pub mod auth;
pub mod client;
pub mod container;
pub mod image;
pub mod live;
pub mod network;
pub mod ops;
pub mod recreate;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use auth::AuthResolver;
pub use client::{DockerEngine, EngineError};
pub use ops::{EngineOps, ListOpts, NetworkAttachment, RecreateSpec};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeEngine;
