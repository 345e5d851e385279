//! Relational-store connection provisioning

use crate::config::SqlConfig;
use crate::logging::QueryLogger;
use crate::tls::TlsMaterial;
use crate::{Error, Result};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{ConnectOptions, Connection, PgConnection};
use std::time::Instant;

const BACKEND: &str = "postgres";
const PROBE_STATEMENT: &str = "SELECT 1";

/// Probe-verified handle to a PostgreSQL database.
///
/// Wraps a single driver connection; pooling is the caller's choice and the
/// driver's job. The attached [`QueryLogger`] makes executed statements
/// observable with duration and affected-row count.
pub struct SqlProvider {
    connection: PgConnection,
    logger: QueryLogger,
}

impl SqlProvider {
    /// Provision a relational connection with a fresh logging adapter.
    pub async fn connect(cfg: &SqlConfig) -> Result<Self> {
        Self::connect_with_logger(cfg, QueryLogger::new()).await
    }

    /// Provision a relational connection with a caller-supplied adapter.
    ///
    /// The options are built field-wise from the configuration accessors,
    /// never by string interpolation, so credentials with reserved
    /// characters survive intact. With TLS paths configured, the verified
    /// material rides along as client certificate, key, and root, and the
    /// server certificate is fully verified.
    pub async fn connect_with_logger(cfg: &SqlConfig, logger: QueryLogger) -> Result<Self> {
        metrics::counter!("provision_attempts_total", "backend" => BACKEND).increment(1);
        let options = connect_options(cfg)?;
        let target = format!("{}:{}", cfg.host(), cfg.port());

        let begin = Instant::now();
        let mut connection =
            PgConnection::connect_with(&options)
                .await
                .map_err(|e| Error::Connection {
                    backend: BACKEND,
                    target: target.clone(),
                    reason: format!("open failed: {e}"),
                })?;

        let probe_begin = Instant::now();
        let probe = sqlx::query(PROBE_STATEMENT).execute(&mut connection).await;
        match &probe {
            Ok(result) => {
                let rows = result.rows_affected();
                logger.trace(
                    probe_begin,
                    || (PROBE_STATEMENT.to_string(), Some(rows)),
                    None,
                );
            }
            Err(e) => logger.trace(
                probe_begin,
                || (PROBE_STATEMENT.to_string(), None),
                Some(e as &dyn std::error::Error),
            ),
        }
        probe.map_err(|e| Error::Liveness {
            backend: BACKEND,
            target: target.clone(),
            reason: format!("probe failed: {e}"),
        })?;

        metrics::histogram!("provision_connect_seconds", "backend" => BACKEND)
            .record(begin.elapsed().as_secs_f64());
        logger.info(&format!("relational connection to {target} verified"));

        Ok(Self { connection, logger })
    }

    /// Mutable access to the underlying driver connection.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.connection
    }

    /// Take ownership of the underlying driver connection.
    pub fn into_connection(self) -> PgConnection {
        self.connection
    }

    /// The attached logging adapter.
    pub fn logger(&self) -> &QueryLogger {
        &self.logger
    }

    /// Re-run the liveness probe on the wrapped connection.
    pub async fn ping(&mut self) -> Result<()> {
        self.connection.ping().await.map_err(|e| Error::Liveness {
            backend: BACKEND,
            target: "<established connection>".into(),
            reason: e.to_string(),
        })
    }
}

/// Driver options materialized from the configuration accessors.
fn connect_options(cfg: &SqlConfig) -> Result<PgConnectOptions> {
    let mut options = PgConnectOptions::new()
        .host(cfg.host())
        .port(cfg.port())
        .username(&cfg.username())
        .password(cfg.password())
        .database(&cfg.database())
        .log_statements(log::LevelFilter::Debug);

    if let Some(paths) = cfg.tls() {
        let material = TlsMaterial::load(paths)?;
        options = options
            .ssl_mode(PgSslMode::VerifyFull)
            .ssl_root_cert_from_pem(material.root_pem().to_vec())
            .ssl_client_cert_from_pem(material.cert_pem())
            .ssl_client_key_from_pem(material.key_pem());
    }

    Ok(options)
}
