//! Image reference parsing — registry/name/tag/digest decomposition.

const FLOATING_TAGS: &[&str] = &[
    "latest", "edge", "main", "master", "dev", "develop", "development",
    "nightly", "stable", "beta", "alpha", "canary", "rc", "next", "preview",
];

/// A parsed `[registry[:port]/]name[:tag][@digest]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    raw: String,
    registry: String,
    tag: String,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(raw: &str) -> Self {
        let (without_digest, digest) = match raw.split_once('@') {
            Some((left, right)) => (left, Some(right.to_string())),
            None => (raw, None),
        };

        let (path, tag) = split_tag(without_digest);
        let registry = derive_registry(path);

        Self {
            raw: raw.to_string(),
            registry,
            tag,
            digest,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Substring after the last non-port colon, or empty for an implicit floating tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// True iff a digest is present, or the tag is non-empty and not in the floating set.
    pub fn pinned(&self) -> bool {
        if self.digest.is_some() {
            return true;
        }
        if self.tag.is_empty() {
            return false;
        }
        !FLOATING_TAGS.iter().any(|f| f.eq_ignore_ascii_case(&self.tag))
    }
}

/// Splits `path[:tag]` into `(path, tag)`. A colon only introduces a tag when it
/// isn't followed by a `/` (that pattern is a registry port, e.g. `host:5000/name`).
fn split_tag(s: &str) -> (&str, String) {
    match s.rfind(':') {
        Some(idx) if !s[idx + 1..].contains('/') => (&s[..idx], s[idx + 1..].to_string()),
        _ => (s, String::new()),
    }
}

/// The first path segment is the registry iff it looks like a host (contains
/// `.` or `:`, or is literally `localhost`); otherwise the canonical public hub.
fn derive_registry(path: &str) -> String {
    const DOCKER_HUB: &str = "docker.io";

    let first_segment = path.split('/').next().unwrap_or(path);
    if first_segment.contains('.') || first_segment.contains(':') || first_segment == "localhost" {
        first_segment.to_string()
    } else {
        DOCKER_HUB.to_string()
    }
}
