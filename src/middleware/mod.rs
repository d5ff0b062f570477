//! Middleware Module
//!
//! Pass-through decorators around the terminal store.
//!
//! ## Responsibilities
//! - Intercept get/put/delete/scan calls on their way to the store
//! - React to transaction lifecycle notifications (begin / end)
//! - Buffer mutations until the end of a transaction (write-back cache)
//!
//! ## Call Path
//! ```text
//!   Registry
//!      │
//!      ▼
//!  ┌────────────────┐   ┌──────────────────┐   ┌──────────────┐
//!  │ head decorator │──▶│ ... decorators   │──▶│ terminal     │
//!  │ (last pushed)  │   │ (first pushed)   │   │ store        │
//!  └────────────────┘   └──────────────────┘   └──────────────┘
//! ```
//! Lifecycle notifications travel the same way, head first.

mod cache;
mod chain;
mod logging;

pub use cache::{CacheStats, EntryState, WriteBackCache};
pub use chain::{ChainBuilder, MiddlewareChain};
pub use logging::LoggingMiddleware;

use crate::error::Result;
use crate::store::Store;

/// Transaction lifecycle notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Sent before the transaction body runs
    TransactionBegin,

    /// Sent after the transaction body completed
    TransactionEnd,
}

/// A store decorator
///
/// Every call receives the next layer of the chain. The default
/// implementations delegate unchanged, so a decorator only overrides what it
/// needs.
pub trait Middleware {
    /// Short name used in logs and chain introspection
    fn name(&self) -> &str;

    fn get(&mut self, next: &mut dyn Store, key: &str) -> Result<Option<Vec<u8>>> {
        next.get(key)
    }

    fn put(&mut self, next: &mut dyn Store, key: &str, value: &[u8]) -> Result<()> {
        next.put(key, value)
    }

    fn delete(&mut self, next: &mut dyn Store, key: &str) -> Result<()> {
        next.delete(key)
    }

    fn scan_prefix(&mut self, next: &mut dyn Store, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        next.scan_prefix(prefix)
    }

    /// Handle a lifecycle notification; no-op by default
    fn on_notification(&mut self, _next: &mut dyn Store, _notification: Notification) -> Result<()> {
        Ok(())
    }
}
