//! Composite key builder
//!
//! Joins a type discriminator and encoded attribute fragments into a single
//! string key. Construction is a pure function of its inputs.

use std::fmt;

use crate::error::{EntityKvError, Result};

use super::{AttrValue, Encoder};

/// Leading marker of every composite key
pub const NAMESPACE: char = '\u{0}';

/// Terminator of the discriminator and of every fragment
pub const DELIMITER: char = '\u{0}';

/// A full or partial composite key
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey(String);

impl CompositeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Split a key back into its discriminator and fragments
    pub fn parse(key: &str) -> Result<(String, Vec<String>)> {
        let body = key
            .strip_prefix(NAMESPACE)
            .and_then(|rest| rest.strip_suffix(DELIMITER))
            .ok_or_else(|| EntityKvError::InvalidKey(format!("not a composite key: {:?}", key)))?;

        let mut segments = body.split(DELIMITER).map(str::to_string);
        let entity_type = segments
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| EntityKvError::InvalidKey(format!("missing discriminator: {:?}", key)))?;

        Ok((entity_type, segments.collect()))
    }

    /// Number of attribute fragments in this key
    pub fn fragment_count(&self) -> usize {
        // One delimiter closes the discriminator, one closes each fragment
        self.0.matches(DELIMITER).count().saturating_sub(2)
    }
}

impl fmt::Debug for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeKey({:?})", self.0)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CompositeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CompositeKey> for String {
    fn from(key: CompositeKey) -> Self {
        key.0
    }
}

/// Build the key of a single entity from all of its primary-key parts
pub fn build(entity_type: &str, parts: &[(AttrValue, Encoder)]) -> Result<CompositeKey> {
    assemble(entity_type, parts)
}

/// Build a scan prefix from the first `k` primary-key parts
pub fn build_partial(entity_type: &str, first_parts: &[(AttrValue, Encoder)]) -> Result<CompositeKey> {
    assemble(entity_type, first_parts)
}

/// Build the prefix matching every entity of a type
pub fn build_type_prefix(entity_type: &str) -> Result<CompositeKey> {
    assemble(entity_type, &[])
}

fn assemble(entity_type: &str, parts: &[(AttrValue, Encoder)]) -> Result<CompositeKey> {
    if entity_type.is_empty() {
        return Err(EntityKvError::InvalidKey(
            "entity type discriminator must not be empty".to_string(),
        ));
    }
    check_segment(entity_type)?;

    let mut key = String::with_capacity(entity_type.len() + 2 + parts.len() * 12);
    key.push(NAMESPACE);
    key.push_str(entity_type);
    key.push(DELIMITER);

    for (value, encoder) in parts {
        let fragment = encoder.encode(value)?;
        check_segment(&fragment)?;
        key.push_str(&fragment);
        key.push(DELIMITER);
    }

    Ok(CompositeKey(key))
}

fn check_segment(segment: &str) -> Result<()> {
    if segment.contains(DELIMITER) {
        return Err(EntityKvError::InvalidKey(format!(
            "key segment {:?} contains the reserved delimiter",
            segment
        )));
    }
    Ok(())
}
