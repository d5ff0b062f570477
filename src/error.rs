//! Error types for entitykv
//!
//! Provides a unified error type for all operations. Variants are grouped by
//! how a caller is expected to react to them, see [`ErrorKind`].

use thiserror::Error;

/// Result type alias using EntityKvError
pub type Result<T> = std::result::Result<T, EntityKvError>;

/// Unified error type for entitykv operations
#[derive(Debug, Error)]
pub enum EntityKvError {
    // -------------------------------------------------------------------------
    // Business Outcomes
    // -------------------------------------------------------------------------
    #[error("Entity already exists at key {key:?}")]
    EntityExists { key: String },

    #[error("Entity not found at key {key:?}")]
    EntityNotFound { key: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("No primary key declared for entity type {entity_type}")]
    MissingPrimaryKey { entity_type: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Caller Contract Errors
    // -------------------------------------------------------------------------
    #[error("Entity type {entity_type} has {expected} key attributes, got {actual}")]
    InvalidKeyArity {
        entity_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("Key {key:?} is already marked for deletion in this transaction")]
    WriteAfterDelete { key: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Transaction lifecycle violation: {0}")]
    Lifecycle(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(String),
}

/// Coarse classification of an [`EntityKvError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected, branchable outcome (exists / not found)
    Business,

    /// Fatal setup problem, raised once at build or first use
    Configuration,

    /// Programming error on the caller's side; never retried
    CallerContract,

    /// Codec failure; recoverable at the call site
    Serialization,

    /// Opaque failure from the underlying store
    Store,
}

impl EntityKvError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EntityExists { .. } | Self::EntityNotFound { .. } => ErrorKind::Business,
            Self::MissingPrimaryKey { .. } | Self::Config(_) => ErrorKind::Configuration,
            Self::InvalidKeyArity { .. }
            | Self::WriteAfterDelete { .. }
            | Self::InvalidArgument(_)
            | Self::InvalidKey(_)
            | Self::Lifecycle(_) => ErrorKind::CallerContract,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// True for the two business outcomes a `try_*` call may suppress
    pub fn is_business(&self) -> bool {
        self.kind() == ErrorKind::Business
    }
}

impl From<serde_json::Error> for EntityKvError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for EntityKvError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
