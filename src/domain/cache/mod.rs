//! Cache domain - key-value store abstraction used by the response cache

mod repository;

pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
