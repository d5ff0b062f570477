//! Registry Module
//!
//! Entity CRUD and queries on top of a (transaction-scoped) store.
//!
//! ## Responsibilities
//! - Build composite keys from registered key descriptors
//! - Enforce create / update / delete preconditions (exists / not found)
//! - Serialize entities through a codec
//! - Prefix scans for whole-type and partial-key queries
//!
//! Every precondition check yields an [`Outcome`]; the `must_*` methods turn
//! conflicts into errors, the `try_*` methods turn them into `false` / `None`
//! and log the suppression.

use crate::codec::{Codec, JsonCodec};
use crate::entity::{Entity, Schema};
use crate::error::{EntityKvError, Result};
use crate::key::{AttrValue, CompositeKey};
use crate::selection::SelectionBuilder;
use crate::store::Store;

/// Result of a precondition-checked operation
#[derive(Debug)]
enum Outcome<T> {
    Done(T),

    /// An entity already exists at the key
    Conflict(CompositeKey),

    /// No entity exists at the key
    NotFound(CompositeKey),
}

impl<T> Outcome<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Outcome::Done(value) => Ok(value),
            Outcome::Conflict(key) => Err(EntityKvError::EntityExists {
                key: key.into_string(),
            }),
            Outcome::NotFound(key) => Err(EntityKvError::EntityNotFound {
                key: key.into_string(),
            }),
        }
    }

    fn into_option(self, operation: &'static str) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Conflict(key) => {
                tracing::debug!(operation, key = ?key.as_str(), "Suppressed entity-exists outcome");
                None
            }
            Outcome::NotFound(key) => {
                tracing::debug!(operation, key = ?key.as_str(), "Suppressed entity-not-found outcome");
                None
            }
        }
    }
}

/// Entity access through a store (normally a transaction's chain head)
pub struct Registry<'a, C: Codec = JsonCodec> {
    store: &'a mut dyn Store,
    schema: &'a Schema,
    codec: C,
}

impl<'a> Registry<'a, JsonCodec> {
    pub fn new(store: &'a mut dyn Store, schema: &'a Schema) -> Self {
        Self::with_codec(store, schema, JsonCodec)
    }
}

impl<'a, C: Codec> Registry<'a, C> {
    pub fn with_codec(store: &'a mut dyn Store, schema: &'a Schema, codec: C) -> Self {
        Self {
            store,
            schema,
            codec,
        }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Store a new entity; fails with `EntityExists` if its key is taken
    pub fn must_create<E: Entity>(&mut self, entity: &E) -> Result<()> {
        self.create(entity)?.into_result()
    }

    /// Like [`Registry::must_create`], but an existing entity yields `false`
    pub fn try_create<E: Entity>(&mut self, entity: &E) -> Result<bool> {
        Ok(self.create(entity)?.into_option("create").is_some())
    }

    fn create<E: Entity>(&mut self, entity: &E) -> Result<Outcome<()>> {
        let key = self.key_of(entity)?;
        tracing::debug!(entity_type = E::ENTITY_TYPE, key = ?key.as_str(), "Creating entity");

        if self.exists_at(&key)? {
            return Ok(Outcome::Conflict(key));
        }
        self.write(&key, entity)?;
        Ok(Outcome::Done(()))
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Overwrite an existing entity; fails with `EntityNotFound` if absent
    pub fn must_update<E: Entity>(&mut self, entity: &E) -> Result<()> {
        self.update(entity)?.into_result()
    }

    pub fn try_update<E: Entity>(&mut self, entity: &E) -> Result<bool> {
        Ok(self.update(entity)?.into_option("update").is_some())
    }

    fn update<E: Entity>(&mut self, entity: &E) -> Result<Outcome<()>> {
        let key = self.key_of(entity)?;
        tracing::debug!(entity_type = E::ENTITY_TYPE, key = ?key.as_str(), "Updating entity");

        if !self.exists_at(&key)? {
            return Ok(Outcome::NotFound(key));
        }
        self.write(&key, entity)?;
        Ok(Outcome::Done(()))
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Remove an existing entity; fails with `EntityNotFound` if absent
    pub fn must_delete<E: Entity>(&mut self, entity: &E) -> Result<()> {
        self.delete(entity)?.into_result()
    }

    pub fn try_delete<E: Entity>(&mut self, entity: &E) -> Result<bool> {
        Ok(self.delete(entity)?.into_option("delete").is_some())
    }

    fn delete<E: Entity>(&mut self, entity: &E) -> Result<Outcome<()>> {
        let key = self.key_of(entity)?;
        tracing::debug!(entity_type = E::ENTITY_TYPE, key = ?key.as_str(), "Deleting entity");

        if !self.exists_at(&key)? {
            return Ok(Outcome::NotFound(key));
        }
        self.store.delete(key.as_str())?;
        Ok(Outcome::Done(()))
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Read the entity whose key attributes have exactly `key_parts`
    ///
    /// A wrong number of parts is an `InvalidKeyArity` error, never a
    /// not-found outcome.
    pub fn must_read<E: Entity>(&mut self, key_parts: &[AttrValue]) -> Result<E> {
        self.read::<E>(key_parts)?.into_result()
    }

    pub fn try_read<E: Entity>(&mut self, key_parts: &[AttrValue]) -> Result<Option<E>> {
        Ok(self.read::<E>(key_parts)?.into_option("read"))
    }

    fn read<E: Entity>(&mut self, key_parts: &[AttrValue]) -> Result<Outcome<E>> {
        let key = self.schema.descriptor::<E>()?.key_for(key_parts)?;
        tracing::debug!(entity_type = E::ENTITY_TYPE, key = ?key.as_str(), "Reading entity");

        match self.store.get(key.as_str())? {
            Some(data) if !data.is_empty() => Ok(Outcome::Done(self.codec.decode(&data)?)),
            _ => Ok(Outcome::NotFound(key)),
        }
    }

    /// Every entity of type `E`, in the store's scan order
    pub fn read_all<E: Entity>(&mut self) -> Result<Vec<E>> {
        let prefix = self.schema.descriptor::<E>()?.type_prefix()?;
        self.scan(&prefix)
    }

    /// Entities whose leading key attributes equal `key_parts`
    pub fn read_by_partial_key<E: Entity>(&mut self, key_parts: &[AttrValue]) -> Result<Vec<E>> {
        let prefix = self.schema.descriptor::<E>()?.partial_key(key_parts)?;
        self.scan(&prefix)
    }

    /// [`Registry::read_all`] wrapped in a selection pipeline
    pub fn select<E: Entity>(&mut self) -> Result<SelectionBuilder<E>> {
        Ok(SelectionBuilder::new(self.read_all()?))
    }

    // =========================================================================
    // Keys
    // =========================================================================

    /// Composite key of `entity`
    pub fn key_of<E: Entity>(&self, entity: &E) -> Result<CompositeKey> {
        self.schema.descriptor::<E>()?.key_of(entity)
    }

    /// Whether an entity is stored at `entity`'s key
    pub fn exists<E: Entity>(&mut self, entity: &E) -> Result<bool> {
        let key = self.key_of(entity)?;
        self.exists_at(&key)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn exists_at(&mut self, key: &CompositeKey) -> Result<bool> {
        Ok(self
            .store
            .get(key.as_str())?
            .is_some_and(|value| !value.is_empty()))
    }

    fn write<E: Entity>(&mut self, key: &CompositeKey, entity: &E) -> Result<()> {
        let buffer = self.codec.encode(entity)?;
        tracing::trace!(key = ?key.as_str(), len = buffer.len(), "Writing entity buffer");
        self.store.put(key.as_str(), &buffer)
    }

    fn scan<E: Entity>(&mut self, prefix: &CompositeKey) -> Result<Vec<E>> {
        let entries = self.store.scan_prefix(prefix.as_str())?;
        let entities = entries
            .iter()
            .map(|(_, value)| self.codec.decode(value))
            .collect::<Result<Vec<E>>>()?;

        tracing::debug!(
            entity_type = E::ENTITY_TYPE,
            prefix = ?prefix.as_str(),
            found = entities.len(),
            "Scanned entities"
        );
        Ok(entities)
    }
}
