//! Selection builder
//!
//! In-memory filter / sort / reverse pipeline over an already materialized
//! query result.

use std::cmp::Ordering;

/// Fluent pipeline over a sequence of entities
///
/// Every step consumes the builder and hands it back, so steps chain:
///
/// ```text
/// registry.select::<Order>()?
///     .matching(|o| o.open)
///     .sorted_by_key(|o| o.amount)
///     .descending()
///     .into_first()
/// ```
#[derive(Debug, Clone)]
pub struct SelectionBuilder<E> {
    selection: Vec<E>,
}

impl<E> SelectionBuilder<E> {
    pub fn new(entities: Vec<E>) -> Self {
        Self {
            selection: entities,
        }
    }

    /// Keep only the entities matching `predicate`, preserving order
    pub fn matching<P>(mut self, mut predicate: P) -> Self
    where
        P: FnMut(&E) -> bool,
    {
        let before = self.selection.len();
        self.selection.retain(|entity| predicate(entity));
        tracing::trace!(before, after = self.selection.len(), "Applied matcher");
        self
    }

    /// Stable sort with `compare`
    pub fn sorted_by<F>(mut self, compare: F) -> Self
    where
        F: FnMut(&E, &E) -> Ordering,
    {
        self.selection.sort_by(compare);
        self
    }

    /// Stable sort by the key `f` extracts
    pub fn sorted_by_key<K, F>(mut self, f: F) -> Self
    where
        K: Ord,
        F: FnMut(&E) -> K,
    {
        self.selection.sort_by_key(f);
        self
    }

    /// Reverse the current order
    pub fn descending(mut self) -> Self {
        self.selection.reverse();
        self
    }

    pub fn get(&self) -> &[E] {
        &self.selection
    }

    pub fn first(&self) -> Option<&E> {
        self.selection.first()
    }

    pub fn into_vec(self) -> Vec<E> {
        self.selection
    }

    pub fn into_first(self) -> Option<E> {
        self.selection.into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }
}

impl<E> From<Vec<E>> for SelectionBuilder<E> {
    fn from(entities: Vec<E>) -> Self {
        Self::new(entities)
    }
}
