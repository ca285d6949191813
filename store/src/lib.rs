//! Client-side persistent key/value storage.
//!
//! Mirrors the semantics of a browser's local storage: string keys, string
//! values, last write wins. [`FileStorage`] persists to a single JSON object
//! on disk; [`MemoryStorage`] keeps everything in process and is what tests
//! and ephemeral sessions use.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A string key/value store shared between the controller and front-ends.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> std::io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> std::io::Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> std::io::Result<()>;
}
