//! Image domain — pull, digest lookup, removal.

use bollard::auth::DockerCredentials;
use bollard::query_parameters::{CreateImageOptions, RemoveImageOptions};
use futures_util::stream::StreamExt;

use super::client::{DockerEngine, EngineError};

impl DockerEngine {
    /// Drains the pull progress stream; any error frame fails the whole pull.
    pub async fn pull_impl(&self, image_ref: &str, auth: Option<&str>) -> Result<(), EngineError> {
        let (from_image, tag) = split_image_tag(image_ref);

        let options = Some(CreateImageOptions {
            from_image: Some(from_image),
            tag: Some(tag),
            ..Default::default()
        });

        let credentials = auth.map(|a| DockerCredentials {
            auth: Some(a.to_string()),
            ..Default::default()
        });

        let mut stream = self.client.create_image(options, None, credentials);

        while let Some(frame) = stream.next().await {
            match frame {
                Ok(info) => {
                    if let Some(err) = info.error {
                        return Err(EngineError::PullFailed(err));
                    }
                    tracing::debug!(status = ?info.status, "pull progress");
                }
                Err(e) => return Err(EngineError::PullFailed(e.to_string())),
            }
        }

        Ok(())
    }

    /// First repo digest if present, else the local content id (`Id` field).
    pub async fn image_digest_impl(&self, image_ref: &str) -> Result<String, EngineError> {
        let inspect = self.client.inspect_image(image_ref).await?;

        if let Some(digest) = inspect
            .repo_digests
            .as_ref()
            .and_then(|ds| ds.first())
            .cloned()
        {
            return Ok(digest);
        }

        Ok(inspect.id.unwrap_or_default())
    }

    /// Best-effort; prunes dangling children, never forced.
    pub async fn remove_image_impl(&self, image_id: &str) -> Result<(), EngineError> {
        let options = Some(RemoveImageOptions {
            force: false,
            noprune: false,
            ..Default::default()
        });
        self.client
            .remove_image(image_id, options, None)
            .await
            .map(|_| ())
            .map_err(EngineError::from)
    }
}

/// Splits `name[:tag]` the way bollard's `create_image` expects: `from_image`
/// bare and `tag` separate (digests are passed through verbatim as the tag
/// is only meaningful for named+tagged pulls).
fn split_image_tag(image_ref: &str) -> (String, String) {
    if let Some((name, digest)) = image_ref.split_once('@') {
        return (format!("{name}@{digest}"), String::new());
    }
    match image_ref.rfind(':') {
        Some(idx) if !image_ref[idx + 1..].contains('/') => {
            (image_ref[..idx].to_string(), image_ref[idx + 1..].to_string())
        }
        _ => (image_ref.to_string(), "latest".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_name_and_tag() {
        assert_eq!(split_image_tag("nginx:1.25"), ("nginx".to_string(), "1.25".to_string()));
    }

    #[test]
    fn defaults_tag_to_latest() {
        assert_eq!(split_image_tag("nginx"), ("nginx".to_string(), "latest".to_string()));
    }

    #[test]
    fn digest_reference_has_no_separate_tag() {
        let (name, tag) = split_image_tag("nginx@sha256:abc");
        assert_eq!(name, "nginx@sha256:abc");
        assert_eq!(tag, "");
    }

    #[test]
    fn registry_port_not_mistaken_for_tag() {
        let (name, tag) = split_image_tag("registry.example.com:5000/app:v2");
        assert_eq!(name, "registry.example.com:5000/app");
        assert_eq!(tag, "v2");
    }
}
