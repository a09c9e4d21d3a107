//! assessor-store: Result store backends.
//!
//! Implements the `ResultStore` trait with an in-memory store and a durable
//! JSON-file store, both locking per candidate, plus a timeout wrapper and
//! the `[store]` configuration that picks between them.

pub mod config;
pub mod file;
pub mod locks;
pub mod memory;
pub mod policy;
pub mod timeout;

#[cfg(test)]
mod testing;

pub use config::{load_config, load_config_from, open_store, AssessorConfig, StoreBackend, StoreConfig};
pub use file::FileStore;
pub use locks::KeyedLocks;
pub use memory::MemoryStore;
pub use policy::OverwritePolicy;
pub use timeout::TimeoutStore;
