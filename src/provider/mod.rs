//! Connection providers
//!
//! One provider per backend, each following the same three-phase protocol:
//!
//! 1. Materialize driver options from the configuration accessors; explicit
//!    configuration always beats driver defaults.
//! 2. Attach security: configured TLS paths are loaded and cross-verified,
//!    and any loader failure aborts before network I/O. Absent TLS paths
//!    mean plaintext; there is no negotiated fallback between the two.
//! 3. Connect and probe: open the transport, then issue a single liveness
//!    probe. Transport failures classify as [`crate::Error::Connection`],
//!    probe failures as [`crate::Error::Liveness`]. Neither is retried.
//!
//! A provider value wraps the opaque driver handle and owns it until the
//! caller takes it; teardown is the caller's responsibility.

mod mongo;
mod redis;
mod sql;

pub use mongo::MongoProvider;
pub use redis::{RedisProvider, RedisSentinelProvider};
pub use sql::SqlProvider;
