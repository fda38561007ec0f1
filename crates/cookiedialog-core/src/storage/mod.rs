//! Key-value storage the consent record is persisted in.
//!
//! The contract matches a browser's local storage: synchronous string
//! get/set/remove under a key. Failures are reported, never panicked on; the
//! record store decides how to degrade.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::ConsentResult;

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> ConsentResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> ConsentResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> ConsentResult<()>;
}
