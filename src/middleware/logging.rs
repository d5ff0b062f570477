//! Logging middleware
//!
//! Logs every store call passing through it, before and after delegating.

use crate::config::LogLevel;
use crate::error::Result;
use crate::store::Store;

use super::{Middleware, Notification};

macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($arg)+),
            LogLevel::Debug => tracing::debug!($($arg)+),
            LogLevel::Info => tracing::info!($($arg)+),
        }
    };
}

/// Pass-through decorator that logs all calls
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    level: LogLevel,

    /// Include value bytes in log output
    log_values: bool,
}

impl LoggingMiddleware {
    pub const NAME: &'static str = "logging";

    pub fn new(level: LogLevel, log_values: bool) -> Self {
        Self { level, log_values }
    }

    fn describe(&self, value: Option<&[u8]>) -> String {
        match value {
            None => "<absent>".to_string(),
            Some(bytes) if self.log_values => format!("{:?}", String::from_utf8_lossy(bytes)),
            Some(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new(LogLevel::Debug, false)
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get(&mut self, next: &mut dyn Store, key: &str) -> Result<Option<Vec<u8>>> {
        log_at!(self.level, key = ?key, "Getting state");
        let value = next.get(key)?;
        log_at!(self.level, key = ?key, value = %self.describe(value.as_deref()), "Got state");
        Ok(value)
    }

    fn put(&mut self, next: &mut dyn Store, key: &str, value: &[u8]) -> Result<()> {
        log_at!(self.level, key = ?key, value = %self.describe(Some(value)), "Putting state");
        next.put(key, value)?;
        log_at!(self.level, key = ?key, "Done putting state");
        Ok(())
    }

    fn delete(&mut self, next: &mut dyn Store, key: &str) -> Result<()> {
        log_at!(self.level, key = ?key, "Deleting state");
        next.delete(key)?;
        log_at!(self.level, key = ?key, "Done deleting state");
        Ok(())
    }

    fn scan_prefix(&mut self, next: &mut dyn Store, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        log_at!(self.level, prefix = ?prefix, "Scanning by prefix");
        let entries = next.scan_prefix(prefix)?;
        log_at!(self.level, prefix = ?prefix, found = entries.len(), "Scan finished");
        Ok(entries)
    }

    fn on_notification(&mut self, _next: &mut dyn Store, notification: Notification) -> Result<()> {
        log_at!(self.level, ?notification, "Transaction lifecycle");
        Ok(())
    }
}
