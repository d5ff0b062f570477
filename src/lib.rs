//! # entitykv
//!
//! Typed entity access over a transactional key-value store, with:
//! - Order-preserving composite keys built from encoded primary-key attributes
//! - A chain of pass-through store decorators (middleware)
//! - A per-transaction write-back cache flushed exactly once at transaction end
//! - Must/try CRUD operations and an in-memory selection pipeline
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TxContext                              │
//! │            (begin → registry calls → commit)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Registry                               │
//! │        (key descriptors, codec, must/try outcomes)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  get / put / delete / scan_prefix
//!          ┌────────────▼────────────┐
//!          │    Middleware Chain     │
//!          │  logging → write-back   │
//!          └────────────┬────────────┘
//!                       │  flushed on TransactionEnd
//!                       ▼
//!               ┌───────────────┐
//!               │  Store        │
//!               │  (terminal)   │
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod entity;
pub mod codec;
pub mod store;
pub mod middleware;
pub mod registry;
pub mod selection;
pub mod context;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EntityKvError, ErrorKind, Result};
pub use config::{Config, LogLevel, MiddlewareKind};
pub use key::{AttrValue, CompositeKey, Encoder, Width};
pub use entity::{Entity, EntityDescriptor, Schema};
pub use codec::{BincodeCodec, Codec, JsonCodec};
pub use store::{MemoryStore, Store};
pub use middleware::{ChainBuilder, Middleware, MiddlewareChain, Notification, WriteBackCache};
pub use registry::Registry;
pub use selection::SelectionBuilder;
pub use context::TxContext;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of entitykv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
