//! Cache connection provisioning (standalone and Sentinel failover)

use crate::config::{RedisConfig, RedisSentinelConfig};
use crate::tls::TlsMaterial;
use crate::{Error, Result};
use redis::aio::MultiplexedConnection;
use redis::sentinel::{SentinelClient, SentinelNodeConnectionInfo, SentinelServerType};
use redis::{ClientTlsConfig, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, TlsCertificates};
use std::time::Instant;

const BACKEND: &str = "redis";

/// Probe-verified handle to a standalone Redis server.
#[derive(Debug)]
pub struct RedisProvider {
    client: redis::Client,
    connection: MultiplexedConnection,
}

impl RedisProvider {
    /// Provision a standalone cache connection.
    ///
    /// The effective address is the configuration's explicit `addr` or its
    /// `host:port` composite. With TLS paths configured, the verified PEM
    /// material is handed to the driver and the connection is opened over
    /// TLS; otherwise it is plaintext.
    pub async fn connect(cfg: &RedisConfig) -> Result<Self> {
        metrics::counter!("provision_attempts_total", "backend" => BACKEND).increment(1);
        let info = connection_info(cfg)?;
        let target = cfg.addr();

        let client = match cfg.tls() {
            Some(paths) => {
                let material = TlsMaterial::load(paths)?;
                redis::Client::build_with_tls(info, certificates(&material))
            }
            None => redis::Client::open(info),
        }
        .map_err(|e| Error::Config(format!("invalid cache connection options: {e}")))?;

        let begin = Instant::now();
        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::Connection {
                backend: BACKEND,
                target: target.clone(),
                reason: e.to_string(),
            })?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut connection)
            .await
            .map_err(|e| Error::Liveness {
                backend: BACKEND,
                target: target.clone(),
                reason: e.to_string(),
            })?;

        metrics::histogram!("provision_connect_seconds", "backend" => BACKEND)
            .record(begin.elapsed().as_secs_f64());
        tracing::debug!(target = %target, db = cfg.db(), "cache connection verified");

        Ok(Self { client, connection })
    }

    /// Underlying driver client.
    pub fn client(&self) -> &redis::Client {
        &self.client
    }

    /// Clone of the probed multiplexed connection.
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

/// Probe-verified handle to a Redis Sentinel (failover) deployment.
///
/// The sentinels elect the live primary; the handle tracks it across
/// failovers.
pub struct RedisSentinelProvider {
    client: SentinelClient,
    connection: MultiplexedConnection,
}

impl RedisSentinelProvider {
    /// Provision a connection through a sentinel topology.
    ///
    /// Discovery nodes are contacted in configured order and carry the
    /// control-plane credential; the elected primary is reached with the
    /// data-plane credential and database index.
    pub async fn connect(cfg: &RedisSentinelConfig) -> Result<Self> {
        metrics::counter!("provision_attempts_total", "backend" => BACKEND).increment(1);
        let (nodes, master_name, node_info) = failover_topology(cfg)?;
        let target = cfg.hosts().join(",");

        let mut client =
            SentinelClient::build(nodes, master_name, Some(node_info), SentinelServerType::Master)
                .map_err(|e| Error::Config(format!("invalid failover topology: {e}")))?;

        let begin = Instant::now();
        let mut connection = client
            .get_async_connection()
            .await
            .map_err(|e| Error::Connection {
                backend: BACKEND,
                target: target.clone(),
                reason: e.to_string(),
            })?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut connection)
            .await
            .map_err(|e| Error::Liveness {
                backend: BACKEND,
                target: target.clone(),
                reason: e.to_string(),
            })?;

        metrics::histogram!("provision_connect_seconds", "backend" => BACKEND)
            .record(begin.elapsed().as_secs_f64());
        tracing::debug!(
            target = %target,
            master = cfg.master_name(),
            db = cfg.db(),
            "failover cache connection verified"
        );

        Ok(Self { client, connection })
    }

    /// Underlying sentinel client.
    pub fn client_mut(&mut self) -> &mut SentinelClient {
        &mut self.client
    }

    /// Clone of the probed connection to the elected primary.
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

/// Driver connection info for a standalone deployment.
fn connection_info(cfg: &RedisConfig) -> Result<ConnectionInfo> {
    let (host, port) = split_host_port(&cfg.addr())?;
    let addr = if cfg.tls().is_some() {
        ConnectionAddr::TcpTls {
            host,
            port,
            insecure: false,
            tls_params: None,
        }
    } else {
        ConnectionAddr::Tcp(host, port)
    };
    Ok(ConnectionInfo {
        addr,
        redis: RedisConnectionInfo {
            db: cfg.db(),
            username: None,
            password: cfg.password().map(str::to_owned),
            ..Default::default()
        },
    })
}

/// Discovery nodes, master group name, and data-plane connection info for a
/// sentinel deployment. Order of the discovery list is preserved.
fn failover_topology(
    cfg: &RedisSentinelConfig,
) -> Result<(Vec<ConnectionInfo>, String, SentinelNodeConnectionInfo)> {
    cfg.validate()?;

    let nodes = cfg
        .hosts()
        .iter()
        .map(|host| {
            let (host, port) = split_host_port(host)?;
            Ok(ConnectionInfo {
                addr: ConnectionAddr::Tcp(host, port),
                redis: RedisConnectionInfo {
                    db: 0,
                    username: None,
                    password: cfg.sentinel_password().map(str::to_owned),
                    ..Default::default()
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let node_info = SentinelNodeConnectionInfo {
        tls_mode: None,
        redis_connection_info: Some(RedisConnectionInfo {
            db: cfg.db(),
            username: None,
            password: cfg.password().map(str::to_owned),
            ..Default::default()
        }),
    };

    Ok((nodes, cfg.master_name().to_string(), node_info))
}

fn certificates(material: &TlsMaterial) -> TlsCertificates {
    TlsCertificates {
        client_tls: Some(ClientTlsConfig {
            client_cert: material.cert_pem().to_vec(),
            client_key: material.key_pem().to_vec(),
        }),
        root_cert: Some(material.root_pem().to_vec()),
    }
}

fn split_host_port(addr: &str) -> Result<(String, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| Error::Config(format!("cache address '{addr}' is not host:port")))?;
    if host.is_empty() {
        return Err(Error::Config(format!("cache address '{addr}' has no host")));
    }
    let port = port
        .parse()
        .map_err(|_| Error::Config(format!("invalid port in cache address '{addr}'")))?;
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MASTER_NAME;
    use crate::tls::TlsPaths;

    fn tcp_parts(addr: &ConnectionAddr) -> (&str, u16) {
        match addr {
            ConnectionAddr::Tcp(host, port) => (host, *port),
            other => panic!("expected plain TCP address, got {other:?}"),
        }
    }

    #[test]
    fn options_carry_composite_address_and_db() {
        let cfg = RedisConfig {
            host: "127.0.0.1".into(),
            port: 6379,
            db: 0,
            ..Default::default()
        };
        let info = connection_info(&cfg).unwrap();
        assert_eq!(tcp_parts(&info.addr), ("127.0.0.1", 6379));
        assert_eq!(info.redis.db, 0);
        assert_eq!(info.redis.password, None);
    }

    #[test]
    fn explicit_addr_takes_precedence() {
        let cfg = RedisConfig {
            addr: Some("10.1.2.3:7001".into()),
            host: "ignored".into(),
            port: 1,
            password: Some("secret".into()),
            db: 4,
            ..Default::default()
        };
        let info = connection_info(&cfg).unwrap();
        assert_eq!(tcp_parts(&info.addr), ("10.1.2.3", 7001));
        assert_eq!(info.redis.db, 4);
        assert_eq!(info.redis.password.as_deref(), Some("secret"));
    }

    #[test]
    fn tls_paths_switch_the_transport() {
        let cfg = RedisConfig {
            tls: Some(TlsPaths {
                certificate: "/tls/client.crt".into(),
                key: "/tls/client.key".into(),
                root_certificate: "/tls/root.crt".into(),
            }),
            ..Default::default()
        };
        let info = connection_info(&cfg).unwrap();
        match info.addr {
            ConnectionAddr::TcpTls { insecure, .. } => assert!(!insecure),
            other => panic!("expected TLS address, got {other:?}"),
        }
    }

    #[test]
    fn malformed_address_is_config_error() {
        let cfg = RedisConfig {
            addr: Some("no-port-here".into()),
            ..Default::default()
        };
        assert!(matches!(connection_info(&cfg), Err(Error::Config(_))));
    }

    #[test]
    fn topology_preserves_discovery_order() {
        let cfg = RedisSentinelConfig {
            hosts: vec![
                "10.0.0.3:26379".into(),
                "10.0.0.1:26380".into(),
                "10.0.0.2:26381".into(),
            ],
            ..Default::default()
        };
        let (nodes, _, _) = failover_topology(&cfg).unwrap();
        let hosts: Vec<_> = nodes.iter().map(|n| tcp_parts(&n.addr)).collect();
        assert_eq!(
            hosts,
            vec![("10.0.0.3", 26379), ("10.0.0.1", 26380), ("10.0.0.2", 26381)]
        );
    }

    #[test]
    fn empty_master_name_synthesizes_default_group() {
        let cfg = RedisSentinelConfig {
            master_name: String::new(),
            hosts: vec!["10.0.0.1:26379".into()],
            password: Some("p".into()),
            db: 1,
            ..Default::default()
        };
        let (_, master_name, node_info) = failover_topology(&cfg).unwrap();
        assert_eq!(master_name, DEFAULT_MASTER_NAME);
        let data_plane = node_info.redis_connection_info.unwrap();
        assert_eq!(data_plane.db, 1);
        assert_eq!(data_plane.password.as_deref(), Some("p"));
    }

    #[test]
    fn control_plane_password_reaches_discovery_nodes() {
        let cfg = RedisSentinelConfig {
            hosts: vec!["10.0.0.1:26379".into()],
            password: Some("data".into()),
            sentinel_password: Some("control".into()),
            ..Default::default()
        };
        let (nodes, _, node_info) = failover_topology(&cfg).unwrap();
        assert_eq!(nodes[0].redis.password.as_deref(), Some("control"));
        let data_plane = node_info.redis_connection_info.unwrap();
        assert_eq!(data_plane.password.as_deref(), Some("data"));
    }

    #[test]
    fn control_plane_password_falls_back_to_data_plane() {
        let cfg = RedisSentinelConfig {
            hosts: vec!["10.0.0.1:26379".into()],
            password: Some("shared".into()),
            ..Default::default()
        };
        let (nodes, _, _) = failover_topology(&cfg).unwrap();
        assert_eq!(nodes[0].redis.password.as_deref(), Some("shared"));
    }

    #[test]
    fn empty_topology_is_config_error() {
        let cfg = RedisSentinelConfig::default();
        assert!(matches!(failover_topology(&cfg), Err(Error::Config(_))));
    }
}
