//! Write-back cache
//!
//! Buffers reads and mutations for one transaction and applies the
//! mutations to the next layer when the transaction ends.
//!
//! ## Per-key State Machine
//! ```text
//!   UNSEEN ──get/put──▶ CLEAN ──put (changed)──▶ DIRTY_WRITE
//!     │                   │                          │
//!     └──────delete───────┴─────────delete───────────┴──▶ DIRTY_DELETE
//! ```
//! `UNSEEN` keys have no entry. A put on `DIRTY_DELETE` is a contradiction
//! and fails.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::error::{EntityKvError, Result};
use crate::store::Store;

use super::{Middleware, Notification};

/// State of a cached key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Matches the next layer (or was written back unchanged)
    Clean,

    /// Holds a value the next layer has not seen yet
    DirtyWrite,

    /// Tombstone; the key will be deleted at flush
    DirtyDelete,
}

#[derive(Debug)]
struct CacheEntry {
    /// Last known value; `None` is an explicit absence
    value: Option<Vec<u8>>,
    state: EntryState,
}

impl CacheEntry {
    fn new(value: Option<Vec<u8>>) -> Self {
        Self {
            value,
            state: EntryState::Clean,
        }
    }

    /// Store `value`, marking the entry dirty only if it actually changed
    fn set_value(&mut self, value: &[u8]) {
        if self.value.as_deref() == Some(value) {
            return;
        }
        self.value = Some(value.to_vec());
        self.state = EntryState::DirtyWrite;
    }

    fn delete(&mut self) {
        self.value = None;
        self.state = EntryState::DirtyDelete;
    }

    /// `(key, value)` as a scan should report it; `None` for tombstones
    fn pending_write(&self, key: &str) -> Option<(String, Vec<u8>)> {
        match (self.state, &self.value) {
            (EntryState::DirtyDelete, _) | (_, None) => None,
            (_, Some(value)) => Some((key.to_string(), value.clone())),
        }
    }
}

/// Entry counts by state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub clean: usize,
    pub dirty_writes: usize,
    pub tombstones: usize,
}

/// Per-transaction write-back cache
///
/// Entries live until the `TransactionEnd` notification, which flushes
/// every dirty entry exactly once and then drops the whole cache.
#[derive(Debug, Default)]
pub struct WriteBackCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl WriteBackCache {
    pub const NAME: &'static str = "write-back-cache";

    pub fn new() -> Self {
        Self::default()
    }

    /// State of `key`, `None` if the key was never touched
    pub fn state(&self, key: &str) -> Option<EntryState> {
        self.entries.get(key).map(|entry| entry.state)
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry in self.entries.values() {
            match entry.state {
                EntryState::Clean => stats.clean += 1,
                EntryState::DirtyWrite => stats.dirty_writes += 1,
                EntryState::DirtyDelete => stats.tombstones += 1,
            }
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply every dirty entry to `next`
    ///
    /// Flushed entries become clean, so calling this again issues no calls
    /// for them. The first failing call aborts the flush; entries not yet
    /// flushed stay dirty.
    pub fn flush(&mut self, next: &mut dyn Store) -> Result<()> {
        let mut writes = 0usize;
        let mut deletes = 0usize;

        for (key, entry) in self.entries.iter_mut() {
            match entry.state {
                EntryState::Clean => continue,
                EntryState::DirtyWrite => {
                    let value = entry.value.as_deref().unwrap_or_default();
                    tracing::trace!(key = ?key, len = value.len(), "Flushing write");
                    next.put(key, value)?;
                    writes += 1;
                }
                EntryState::DirtyDelete => {
                    tracing::trace!(key = ?key, "Flushing delete");
                    next.delete(key)?;
                    deletes += 1;
                }
            }
            entry.state = EntryState::Clean;
        }

        tracing::debug!(writes, deletes, cached = self.entries.len(), "Write-back cache flushed");
        Ok(())
    }

    /// Drop every entry, dirty or not
    fn discard(&mut self) {
        let stats = self.stats();
        if stats.dirty_writes + stats.tombstones > 0 {
            tracing::warn!(
                dirty_writes = stats.dirty_writes,
                tombstones = stats.tombstones,
                "Discarding unflushed cache entries"
            );
        }
        self.entries.clear();
    }
}

impl Middleware for WriteBackCache {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get(&mut self, next: &mut dyn Store, key: &str) -> Result<Option<Vec<u8>>> {
        let entry = match self.entries.entry(key.to_string()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                tracing::trace!(key = ?key, "Cache miss on read; fetching from next layer");
                vacant.insert(CacheEntry::new(next.get(key)?))
            }
        };

        if entry.state == EntryState::DirtyDelete {
            tracing::trace!(key = ?key, "Key marked for deletion; returning absent");
            return Ok(None);
        }

        Ok(entry.value.clone())
    }

    fn put(&mut self, _next: &mut dyn Store, key: &str, value: &[u8]) -> Result<()> {
        let entry = self.entries.entry(key.to_string()).or_insert_with(|| {
            tracing::trace!(key = ?key, "Cache miss on write; creating blind entry");
            CacheEntry::new(None)
        });

        if entry.state == EntryState::DirtyDelete {
            return Err(EntityKvError::WriteAfterDelete {
                key: key.to_string(),
            });
        }

        entry.set_value(value);
        Ok(())
    }

    fn delete(&mut self, _next: &mut dyn Store, key: &str) -> Result<()> {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new(None))
            .delete();
        Ok(())
    }

    /// Next layer's entries with this transaction's dirty entries merged in
    ///
    /// Both sides are in key order; the result is too. Dirty writes replace
    /// or add entries, tombstones remove them.
    fn scan_prefix(&mut self, next: &mut dyn Store, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let base = next.scan_prefix(prefix)?;
        let mut dirty = self
            .entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(_, entry)| entry.state != EntryState::Clean)
            .peekable();
        let mut merged = Vec::with_capacity(base.len());

        for (key, value) in base {
            // Cache-only keys sorting before this one
            while let Some((cached_key, entry)) = dirty.next_if(|(k, _)| k.as_str() < key.as_str()) {
                merged.extend(entry.pending_write(cached_key));
            }

            match dirty.next_if(|(k, _)| k.as_str() == key.as_str()) {
                Some((cached_key, entry)) => merged.extend(entry.pending_write(cached_key)),
                None => merged.push((key, value)),
            }
        }

        for (cached_key, entry) in dirty {
            merged.extend(entry.pending_write(cached_key));
        }

        Ok(merged)
    }

    fn on_notification(&mut self, next: &mut dyn Store, notification: Notification) -> Result<()> {
        match notification {
            Notification::TransactionBegin => self.discard(),
            Notification::TransactionEnd => {
                self.flush(next)?;
                self.entries.clear();
            }
        }
        Ok(())
    }
}
