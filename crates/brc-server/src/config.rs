use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use brc_protocol::{Limits, DEFAULT_MAX_BLOB_SIZE, DEFAULT_MAX_UID_LEN};
use brc_store::StoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::handler::HandlerConfig;

pub const DEFAULT_PORT: u16 = 5133;
pub const DEFAULT_STORE_PATH: &str = "/home/bbs/brcstore/database";
/// One maximum-sized BRC record.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 48 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store_path: PathBuf,
    /// Connections served at once; further ones wait or are refused per `admission`.
    pub max_connections: usize,
    pub admission: AdmissionPolicy,
    /// Threads in the blocking pool that runs store calls.
    pub store_workers: usize,
    /// Per-connection read buffer. Defaults to one maximum-sized BRC record.
    pub read_buffer_size: usize,
    pub max_uid_len: usize,
    pub max_blob_size: usize,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            max_connections: 1024,
            admission: AdmissionPolicy::Queue,
            store_workers: 4,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_uid_len: DEFAULT_MAX_UID_LEN,
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ServerResult<()> {
        let checks = [
            (self.max_connections, "max_connections"),
            (self.store_workers, "store_workers"),
            (self.read_buffer_size, "read_buffer_size"),
            (self.max_uid_len, "max_uid_len"),
        ];
        for (value, name) in checks {
            if value == 0 {
                return Err(ServerError::Config(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }

    pub fn handler_config(&self) -> HandlerConfig {
        HandlerConfig {
            limits: Limits {
                max_uid_len: self.max_uid_len,
                max_blob_size: self.max_blob_size,
            },
            read_buffer_size: self.read_buffer_size,
        }
    }
}

/// What the listener does once `max_connections` handlers are running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionPolicy {
    /// Stop accepting until a handler finishes; new peers wait in the listen backlog.
    #[default]
    Queue,
    /// Accept and close immediately.
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use brc_store::Durability;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:5133".parse::<SocketAddr>().unwrap());
        assert_eq!(c.store_path, PathBuf::from("/home/bbs/brcstore/database"));
        assert_eq!(c.admission, AdmissionPolicy::Queue);
        assert_eq!(c.read_buffer_size, 49152);
        assert_eq!(c.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn toml_overrides() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:6000"
            store_path = "/var/lib/brc"
            max_connections = 8
            admission = "reject"

            [store]
            durability = "eventual"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 6000);
        assert_eq!(c.store_path, PathBuf::from("/var/lib/brc"));
        assert_eq!(c.max_connections, 8);
        assert_eq!(c.admission, AdmissionPolicy::Reject);
        assert_eq!(c.store.durability, Durability::Eventual);
        assert_eq!(c.store_workers, 4);
    }

    #[test]
    fn zero_limits_rejected() {
        let err = ServerConfig::from_toml_str("max_connections = 0").unwrap_err();
        assert!(matches!(err, ServerError::Config(ref m) if m.contains("max_connections")));
    }

    #[test]
    fn unknown_admission_rejected() {
        assert!(ServerConfig::from_toml_str("admission = \"drop\"").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brcstored.toml");
        std::fs::write(&path, "store_workers = 2\n").unwrap();
        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.store_workers, 2);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = ServerConfig::load("/nonexistent/brcstored.toml").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn handler_config_carries_limits() {
        let c = ServerConfig { max_uid_len: 64, max_blob_size: 1024, ..ServerConfig::default() };
        let h = c.handler_config();
        assert_eq!(h.limits.max_uid_len, 64);
        assert_eq!(h.limits.max_blob_size, 1024);
        assert_eq!(h.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
    }
}
