//! Backend configuration family
//!
//! Four read-only value objects, one per backend. Fields are plain data
//! handed over by an external configuration loader; accessor methods
//! implement the default-synthesis rules, so every read yields a usable
//! value even when the underlying field was left unset. Providers take
//! configurations by reference and never mutate them.

mod mongo;
mod redis;
mod sentinel;
mod sql;

pub use mongo::MongoConfig;
pub use redis::RedisConfig;
pub use sentinel::{RedisSentinelConfig, DEFAULT_MASTER_NAME};
pub use sql::SqlConfig;
