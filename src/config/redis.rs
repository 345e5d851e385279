//! Standalone cache configuration

use crate::tls::TlsPaths;
use serde::{Deserialize, Serialize};

/// Configuration for a standalone Redis deployment.
///
/// The effective address is either the explicit `addr` or a `host:port`
/// composite synthesized from the discrete fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Explicit address; overrides `host`/`port` when set
    pub addr: Option<String>,
    /// Host used to synthesize the address when `addr` is unset
    pub host: String,
    /// Port used to synthesize the address when `addr` is unset
    pub port: u16,
    /// Data-plane password, if the server requires one
    pub password: Option<String>,
    /// Numeric database index selected on connect
    pub db: i64,
    /// Mutual-TLS paths; `None` means plaintext
    pub tls: Option<TlsPaths>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: None,
            host: "127.0.0.1".into(),
            port: 6379,
            password: None,
            db: 0,
            tls: None,
        }
    }
}

impl RedisConfig {
    /// Effective address: the explicit `addr` when set, else `host:port`.
    pub fn addr(&self) -> String {
        match self.addr.as_deref() {
            Some(addr) if !addr.is_empty() => addr.to_string(),
            _ => format!("{}:{}", self.host, self.port),
        }
    }

    /// Data-plane password, with empty strings treated as unset.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Database index (0 when unspecified).
    pub fn db(&self) -> i64 {
        self.db
    }

    /// TLS path triple, when mutual TLS is configured.
    pub fn tls(&self) -> Option<&TlsPaths> {
        self.tls.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_synthesizes_host_port_composite() {
        let cfg = RedisConfig {
            host: "cache.internal".into(),
            port: 6380,
            ..Default::default()
        };
        assert_eq!(cfg.addr(), "cache.internal:6380");
    }

    #[test]
    fn explicit_addr_wins_over_composite() {
        let cfg = RedisConfig {
            addr: Some("10.0.0.5:7000".into()),
            host: "ignored".into(),
            port: 1,
            ..Default::default()
        };
        assert_eq!(cfg.addr(), "10.0.0.5:7000");
    }

    #[test]
    fn empty_addr_falls_back_to_composite() {
        let cfg = RedisConfig {
            addr: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(cfg.addr(), "127.0.0.1:6379");
    }

    #[test]
    fn db_defaults_to_zero() {
        assert_eq!(RedisConfig::default().db(), 0);
    }

    #[test]
    fn empty_password_reads_as_unset() {
        let cfg = RedisConfig {
            password: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(cfg.password(), None);
    }

    #[test]
    fn deserializes_from_partial_value() {
        let cfg: RedisConfig =
            serde_json::from_str(r#"{"host": "127.0.0.1", "port": 6379, "db": 0}"#).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:6379");
        assert_eq!(cfg.db(), 0);
        assert!(cfg.tls().is_none());
    }
}
