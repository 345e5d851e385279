//! Probe-verified connection provisioning for backing stores.
//!
//! This crate turns declarative configuration into live, verified client
//! handles for three backends:
//!
//! * a document database (MongoDB)
//! * a key/value cache (Redis, standalone or Sentinel failover mode)
//! * a relational database (PostgreSQL)
//!
//! Each provider follows the same three-phase protocol: materialize driver
//! options from the configuration accessors, attach verified TLS material
//! when the configuration carries certificate paths, then connect and issue
//! a single liveness probe. A provider call either returns a handle that
//! already answered its probe, or a typed [`Error`] naming the phase that
//! failed. There is no retry and no partial success.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> datastore_providers::Result<()> {
//! use datastore_providers::config::RedisConfig;
//! use datastore_providers::RedisProvider;
//!
//! let cfg = RedisConfig {
//!     host: "127.0.0.1".into(),
//!     port: 6379,
//!     ..Default::default()
//! };
//! let provider = RedisProvider::connect(&cfg).await?;
//! let mut conn = provider.connection();
//! # Ok(())
//! # }
//! ```
//!
//! Provisioning is sequential within a call and independent across calls:
//! repeated calls with the same configuration yield independent handles,
//! and the caller owns each handle's lifecycle from the moment it is
//! returned.

pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod tls;

pub use error::{Error, Result};
pub use logging::QueryLogger;
pub use provider::{MongoProvider, RedisProvider, RedisSentinelProvider, SqlProvider};
pub use tls::{TlsMaterial, TlsPaths};
