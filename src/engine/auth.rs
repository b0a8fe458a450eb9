//! Registry authentication resolution against Docker-style `config.json` files.
//!
//! Consults, in order: an explicit secret path, the conventional user-home
//! config, then a system-wide config. The first file that exists and
//! contains a matching entry wins; credentials are never logged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const CANONICAL_HUB_KEYS: &[&str] = &[
    "docker.io",
    "https://index.docker.io/v1/",
    "registry-1.docker.io",
];

#[derive(Debug, Deserialize)]
struct DockerConfigFile {
    #[serde(default)]
    auths: HashMap<String, AuthEntry>,
}

#[derive(Debug, Deserialize)]
struct AuthEntry {
    auth: Option<String>,
}

pub struct AuthResolver {
    search_paths: Vec<PathBuf>,
}

impl AuthResolver {
    /// `explicit_path` is the operator-configured override, if any. The
    /// remaining candidates are the conventional user-home and system-wide
    /// Docker config locations.
    pub fn new(explicit_path: Option<&str>, home_dir: Option<&str>) -> Self {
        let mut search_paths = Vec::new();
        if let Some(p) = explicit_path {
            search_paths.push(PathBuf::from(p));
        }
        if let Some(home) = home_dir {
            search_paths.push(Path::new(home).join(".docker/config.json"));
        }
        search_paths.push(PathBuf::from("/etc/docker/config.json"));
        Self { search_paths }
    }

    /// Returns the base64 `auth` string for `registry`, or `None` to proceed
    /// unauthenticated.
    pub fn resolve(&self, registry: &str) -> Option<String> {
        for path in &self.search_paths {
            let Ok(contents) = std::fs::read_to_string(path) else {
                continue;
            };
            let Ok(parsed) = serde_json::from_str::<DockerConfigFile>(&contents) else {
                continue;
            };
            if let Some(auth) = match_registry(&parsed.auths, registry) {
                return Some(auth);
            }
        }
        None
    }
}

fn match_registry(auths: &HashMap<String, AuthEntry>, registry: &str) -> Option<String> {
    let candidates: Vec<String> = if is_docker_hub(registry) {
        CANONICAL_HUB_KEYS.iter().map(|s| s.to_string()).collect()
    } else {
        vec![registry.to_string(), format!("https://{registry}")]
    };

    for key in candidates {
        if let Some(entry) = auths.get(&key) {
            if let Some(auth) = &entry.auth {
                return Some(auth.clone());
            }
        }
    }
    None
}

fn is_docker_hub(registry: &str) -> bool {
    registry == "docker.io"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_registry_key() {
        let mut auths = HashMap::new();
        auths.insert(
            "registry.example.com".to_string(),
            AuthEntry { auth: Some("dXNlcjpwYXNz".to_string()) },
        );
        assert_eq!(
            match_registry(&auths, "registry.example.com"),
            Some("dXNlcjpwYXNz".to_string())
        );
    }

    #[test]
    fn matches_https_prefixed_key() {
        let mut auths = HashMap::new();
        auths.insert(
            "https://registry.example.com".to_string(),
            AuthEntry { auth: Some("abc".to_string()) },
        );
        assert_eq!(match_registry(&auths, "registry.example.com"), Some("abc".to_string()));
    }

    #[test]
    fn docker_hub_tries_legacy_keys() {
        let mut auths = HashMap::new();
        auths.insert(
            "https://index.docker.io/v1/".to_string(),
            AuthEntry { auth: Some("hubtoken".to_string()) },
        );
        assert_eq!(match_registry(&auths, "docker.io"), Some("hubtoken".to_string()));
    }

    #[test]
    fn no_match_returns_none() {
        let auths = HashMap::new();
        assert_eq!(match_registry(&auths, "docker.io"), None);
    }
}
