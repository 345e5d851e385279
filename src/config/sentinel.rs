//! Sentinel failover cache configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Master group name used when the configuration leaves it empty.
pub const DEFAULT_MASTER_NAME: &str = "mymaster";

/// Configuration for a Redis Sentinel (failover) deployment.
///
/// Instead of one address, a sentinel topology names a master group and an
/// ordered list of discovery nodes. The sentinels elect the live primary;
/// this configuration only has to describe a coherent topology.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisSentinelConfig {
    /// Master group name; empty means [`DEFAULT_MASTER_NAME`]
    pub master_name: String,
    /// Ordered discovery-node addresses (`host:port`)
    pub hosts: Vec<String>,
    /// Data-plane password for the elected primary
    pub password: Option<String>,
    /// Control-plane password for the sentinel nodes themselves
    pub sentinel_password: Option<String>,
    /// Numeric database index selected on the data plane
    pub db: i64,
}

impl RedisSentinelConfig {
    /// Master group name, defaulting to [`DEFAULT_MASTER_NAME`] when empty.
    pub fn master_name(&self) -> &str {
        if self.master_name.is_empty() {
            DEFAULT_MASTER_NAME
        } else {
            &self.master_name
        }
    }

    /// Discovery-node addresses in configured order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Data-plane password, with empty strings treated as unset.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Control-plane password. Falls back to the data-plane password when
    /// no distinct sentinel credential is supplied.
    pub fn sentinel_password(&self) -> Option<&str> {
        self.sentinel_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| self.password())
    }

    /// Database index (0 when unspecified).
    pub fn db(&self) -> i64 {
        self.db
    }

    /// A usable topology needs at least one discovery address.
    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            return Err(Error::Config(
                "sentinel topology needs at least one discovery address".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_master_name_synthesizes_default() {
        let cfg = RedisSentinelConfig {
            master_name: String::new(),
            hosts: vec!["10.0.0.1:26379".into()],
            password: Some("p".into()),
            db: 1,
            ..Default::default()
        };
        assert_eq!(cfg.master_name(), DEFAULT_MASTER_NAME);
    }

    #[test]
    fn configured_master_name_is_kept() {
        let cfg = RedisSentinelConfig {
            master_name: "orders".into(),
            ..Default::default()
        };
        assert_eq!(cfg.master_name(), "orders");
    }

    #[test]
    fn sentinel_password_falls_back_to_data_plane() {
        let cfg = RedisSentinelConfig {
            password: Some("data".into()),
            sentinel_password: None,
            ..Default::default()
        };
        assert_eq!(cfg.sentinel_password(), Some("data"));
    }

    #[test]
    fn distinct_sentinel_password_is_kept() {
        let cfg = RedisSentinelConfig {
            password: Some("data".into()),
            sentinel_password: Some("control".into()),
            ..Default::default()
        };
        assert_eq!(cfg.sentinel_password(), Some("control"));
    }

    #[test]
    fn hosts_preserve_configured_order() {
        let cfg = RedisSentinelConfig {
            hosts: vec![
                "10.0.0.3:26379".into(),
                "10.0.0.1:26379".into(),
                "10.0.0.2:26379".into(),
            ],
            ..Default::default()
        };
        assert_eq!(
            cfg.hosts(),
            &["10.0.0.3:26379", "10.0.0.1:26379", "10.0.0.2:26379"]
        );
    }

    #[test]
    fn empty_hosts_fail_validation() {
        let cfg = RedisSentinelConfig::default();
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }
}
