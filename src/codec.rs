//! Entity codecs
//!
//! Turn entities into the byte buffers kept in the store and back.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Serializer used by the registry
pub trait Codec {
    fn encode<E: Serialize>(&self, entity: &E) -> Result<Vec<u8>>;

    fn decode<E: DeserializeOwned>(&self, bytes: &[u8]) -> Result<E>;
}

/// UTF-8 JSON; the default codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<E: Serialize>(&self, entity: &E) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(entity)?)
    }

    fn decode<E: DeserializeOwned>(&self, bytes: &[u8]) -> Result<E> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Compact binary encoding
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<E: Serialize>(&self, entity: &E) -> Result<Vec<u8>> {
        Ok(bincode::serialize(entity)?)
    }

    fn decode<E: DeserializeOwned>(&self, bytes: &[u8]) -> Result<E> {
        Ok(bincode::deserialize(bytes)?)
    }
}
