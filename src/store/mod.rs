//! Store Module
//!
//! The narrow interface to the underlying key-value store.
//!
//! ## Responsibilities
//! - Point reads, writes and deletes by string key
//! - Ordered prefix scans used for type and partial-key queries
//!
//! Every middleware layer and the terminal store implement [`Store`], so a
//! chain head is interchangeable with a bare store.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;

/// A synchronous key-value store
///
/// Errors returned by implementations are propagated unchanged by every
/// layer above them.
pub trait Store {
    /// Read the value at `key`; `None` if absent
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` at `key`
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value at `key`
    fn delete(&mut self, key: &str) -> Result<()>;

    /// All entries whose key starts with `prefix`, in the store's native order
    fn scan_prefix(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>>;
}

impl<S: Store + ?Sized> Store for &mut S {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn scan_prefix(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        (**self).scan_prefix(prefix)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn scan_prefix(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        (**self).scan_prefix(prefix)
    }
}
