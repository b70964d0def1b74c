use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Server configuration, loadable from a TOML file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Root directory of the blob store; namespace directories are created
    /// underneath it.
    pub storage_root: PathBuf,
    /// URL prefix all picture routes hang under.
    pub path_prefix: String,
    /// Upper bound on an uploaded (still encoded) body.
    pub max_upload_bytes: usize,
    /// Static session-token table: token value to owner id. Stands in for
    /// an external session backend.
    pub tokens: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8090".parse().unwrap(),
            storage_root: PathBuf::from("./pixvault-data"),
            path_prefix: "/pic".to_string(),
            max_upload_bytes: 32 * 1024 * 1024,
            tokens: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// The prefix with any trailing slash trimmed (`/pic/` and `/pic` are
    /// accepted alike in config files).
    pub fn normalized_prefix(&self) -> String {
        let p = self.path_prefix.trim_end_matches('/');
        if p.is_empty() {
            "/pic".to_string()
        } else {
            p.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8090".parse::<SocketAddr>().unwrap());
        assert_eq!(c.path_prefix, "/pic");
        assert_eq!(c.max_upload_bytes, 32 * 1024 * 1024);
        assert!(c.tokens.is_empty());
    }

    #[test]
    fn prefix_normalization() {
        let mut c = ServerConfig::default();
        c.path_prefix = "/gallery/".to_string();
        assert_eq!(c.normalized_prefix(), "/gallery");
        c.path_prefix = "/".to_string();
        assert_eq!(c.normalized_prefix(), "/pic");
    }
}
