//! Configuration for entitykv
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::str::FromStr;

use crate::error::EntityKvError;

/// Main configuration for a transaction's middleware chain
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Chain Configuration
    // -------------------------------------------------------------------------
    /// Decorators in push order (innermost first); the last one is the head
    /// Default chain:
    ///   logging --> write-back-cache --> store
    pub middlewares: Vec<MiddlewareKind>,

    // -------------------------------------------------------------------------
    // Logging Middleware Configuration
    // -------------------------------------------------------------------------
    /// Level at which the logging middleware reports store calls
    pub log_level: LogLevel,

    /// Include value bytes (lossy UTF-8) in logging middleware output
    pub log_values: bool,
}

/// Built-in middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareKind {
    /// Buffer mutations until the transaction ends
    WriteBackCache,

    /// Log every store call
    Logging,
}

impl MiddlewareKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MiddlewareKind::WriteBackCache => "write-back-cache",
            MiddlewareKind::Logging => "logging",
        }
    }
}

impl fmt::Display for MiddlewareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MiddlewareKind {
    type Err = EntityKvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "write-back-cache" => Ok(MiddlewareKind::WriteBackCache),
            "logging" => Ok(MiddlewareKind::Logging),
            other => Err(EntityKvError::Config(format!(
                "unknown middleware {:?} (expected \"write-back-cache\" or \"logging\")",
                other
            ))),
        }
    }
}

/// Verbosity of the logging middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            middlewares: vec![MiddlewareKind::WriteBackCache, MiddlewareKind::Logging],
            log_level: LogLevel::Debug,
            log_values: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Replace the whole chain (innermost first)
    pub fn middlewares(mut self, kinds: impl IntoIterator<Item = MiddlewareKind>) -> Self {
        self.config.middlewares = kinds.into_iter().collect();
        self
    }

    /// Append one decorator on top of the chain declared so far
    pub fn middleware(mut self, kind: MiddlewareKind) -> Self {
        self.config.middlewares.push(kind);
        self
    }

    /// Declare no decorators at all
    pub fn no_middlewares(mut self) -> Self {
        self.config.middlewares.clear();
        self
    }

    /// Set the logging middleware level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    /// Include value bytes in logging middleware output
    pub fn log_values(mut self, enabled: bool) -> Self {
        self.config.log_values = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
