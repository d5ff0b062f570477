//! Entity metadata
//!
//! Entities name their type discriminator and expose their attributes by
//! name. Which attributes form the primary key, and how each one is
//! encoded, is declared once per type in an [`EntityDescriptor`] and
//! collected into a [`Schema`].

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{EntityKvError, Result};
use crate::key::{self, AttrValue, CompositeKey, Encoder};

/// A record stored through the registry
pub trait Entity: Serialize + DeserializeOwned {
    /// Type discriminator; the first segment of every key of this type
    const ENTITY_TYPE: &'static str;

    /// Value of the attribute called `name`, `None` if there is no such
    /// attribute or it has no value
    fn attribute(&self, name: &str) -> Option<AttrValue>;
}

/// One primary-key attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub encoder: Encoder,
}

/// Primary-key declaration of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    entity_type: String,

    /// Ordered; defines the composite key layout
    attributes: Vec<KeyAttribute>,
}

impl EntityDescriptor {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            attributes: Vec::new(),
        }
    }

    /// Descriptor for `E`, using its declared discriminator
    pub fn of<E: Entity>() -> Self {
        Self::new(E::ENTITY_TYPE)
    }

    /// Append a key attribute
    pub fn key(mut self, name: impl Into<String>, encoder: Encoder) -> Self {
        self.attributes.push(KeyAttribute {
            name: name.into(),
            encoder,
        });
        self
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn attributes(&self) -> &[KeyAttribute] {
        &self.attributes
    }

    /// Number of key attributes
    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    /// Key of `entity`, read from its attributes
    pub fn key_of<E: Entity>(&self, entity: &E) -> Result<CompositeKey> {
        let values: Vec<AttrValue> = self
            .attributes
            .iter()
            .map(|attr| entity.attribute(&attr.name).unwrap_or(AttrValue::Null))
            .collect();
        self.key_for(&values)
    }

    /// Key built from exactly one value per key attribute
    pub fn key_for(&self, values: &[AttrValue]) -> Result<CompositeKey> {
        if values.len() != self.arity() {
            return Err(self.arity_error(values.len()));
        }
        key::build(&self.entity_type, &self.pair(values))
    }

    /// Scan prefix built from the first `values.len()` key attributes
    pub fn partial_key(&self, values: &[AttrValue]) -> Result<CompositeKey> {
        if values.len() > self.arity() {
            return Err(self.arity_error(values.len()));
        }
        key::build_partial(&self.entity_type, &self.pair(values))
    }

    /// Prefix of every key of this type
    pub fn type_prefix(&self) -> Result<CompositeKey> {
        key::build_type_prefix(&self.entity_type)
    }

    fn pair(&self, values: &[AttrValue]) -> Vec<(AttrValue, Encoder)> {
        values
            .iter()
            .zip(&self.attributes)
            .map(|(value, attr)| (value.clone(), attr.encoder))
            .collect()
    }

    fn arity_error(&self, actual: usize) -> EntityKvError {
        EntityKvError::InvalidKeyArity {
            entity_type: self.entity_type.clone(),
            expected: self.arity(),
            actual,
        }
    }
}

/// Registered key descriptors, by discriminator
#[derive(Debug, Clone, Default)]
pub struct Schema {
    descriptors: HashMap<String, EntityDescriptor>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Descriptor of `E`
    pub fn descriptor<E: Entity>(&self) -> Result<&EntityDescriptor> {
        self.descriptor_by_type(E::ENTITY_TYPE)
    }

    pub fn descriptor_by_type(&self, entity_type: &str) -> Result<&EntityDescriptor> {
        self.descriptors
            .get(entity_type)
            .ok_or_else(|| EntityKvError::MissingPrimaryKey {
                entity_type: entity_type.to_string(),
            })
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.descriptors.contains_key(entity_type)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Builder for Schema
///
/// Descriptors are validated once, in [`SchemaBuilder::build`].
#[derive(Default)]
pub struct SchemaBuilder {
    descriptors: Vec<EntityDescriptor>,
}

impl SchemaBuilder {
    pub fn register(mut self, descriptor: EntityDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn build(self) -> Result<Schema> {
        let mut descriptors = HashMap::with_capacity(self.descriptors.len());

        for descriptor in self.descriptors {
            // Rejects empty discriminators and reserved characters
            descriptor.type_prefix()?;

            if descriptor.attributes.is_empty() {
                return Err(EntityKvError::MissingPrimaryKey {
                    entity_type: descriptor.entity_type,
                });
            }

            let entity_type = descriptor.entity_type.clone();
            if descriptors.insert(entity_type.clone(), descriptor).is_some() {
                return Err(EntityKvError::Config(format!(
                    "entity type {} registered twice",
                    entity_type
                )));
            }
        }

        tracing::debug!(types = descriptors.len(), "Schema built");
        Ok(Schema { descriptors })
    }
}
