//! Shared test helpers: recording store, sample entities, schema

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use entitykv::{
    AttrValue, Encoder, Entity, EntityDescriptor, EntityKvError, MemoryStore, Result, Schema,
    Store, Width,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Logging
// =============================================================================

static TRACING: Once = Once::new();

/// Install a test subscriber once; filter with RUST_LOG
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// =============================================================================
// Recording Store
// =============================================================================

/// A call that reached the terminal store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Put(String, Vec<u8>),
    Delete(String),
    Scan(String),
}

/// MemoryStore that journals every call; clones share data and journal
#[derive(Clone, Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated without recording
    pub fn seeded(entries: &[(&str, &str)]) -> Self {
        let mut store = Self::new();
        for (key, value) in entries {
            store.inner.put(key, value.as_bytes()).unwrap();
        }
        store
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Only the mutating calls
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Put(..) | Call::Delete(_)))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Store for RecordingStore {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        self.calls.borrow_mut().push(Call::Get(key.to_string()));
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::Put(key.to_string(), value.to_vec()));
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::Delete(key.to_string()));
        self.inner.delete(key)
    }

    fn scan_prefix(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.calls.borrow_mut().push(Call::Scan(prefix.to_string()));
        self.inner.scan_prefix(prefix)
    }
}

/// Store whose writes to one key always fail
pub struct FailingStore {
    pub inner: MemoryStore,
    pub poisoned_key: String,
}

impl Store for FailingStore {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if key == self.poisoned_key {
            return Err(EntityKvError::Store(format!("disk full writing {}", key)));
        }
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.inner.delete(key)
    }

    fn scan_prefix(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.inner.scan_prefix(prefix)
    }
}

// =============================================================================
// Sample Entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub warehouse: u32,
    pub id: u32,
    pub name: String,
    pub balance: i64,
}

impl Customer {
    pub fn new(warehouse: u32, id: u32, name: &str, balance: i64) -> Self {
        Self {
            warehouse,
            id,
            name: name.to_string(),
            balance,
        }
    }

    pub fn key_parts(&self) -> Vec<AttrValue> {
        vec![self.warehouse.into(), self.id.into()]
    }
}

impl Entity for Customer {
    const ENTITY_TYPE: &'static str = "CUSTOMER";

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "warehouse" => Some(self.warehouse.into()),
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub customer: String,
    pub amount: u32,
}

impl Entity for Order {
    const ENTITY_TYPE: &'static str = "ORDER";

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "id" => Some(self.id.into()),
            "customer" => Some(self.customer.clone().into()),
            _ => None,
        }
    }
}

/// Shares a discriminator prefix with `ORDER`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub order: u64,
    pub line: u32,
}

impl Entity for OrderLine {
    const ENTITY_TYPE: &'static str = "ORDERLINE";

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "order" => Some(self.order.into()),
            "line" => Some(self.line.into()),
            _ => None,
        }
    }
}

/// Never registered in the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unregistered {
    pub id: u32,
}

impl Entity for Unregistered {
    const ENTITY_TYPE: &'static str = "UNREGISTERED";

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        (name == "id").then(|| self.id.into())
    }
}

pub fn schema() -> Schema {
    Schema::builder()
        .register(
            EntityDescriptor::of::<Customer>()
                .key("warehouse", Encoder::ZeroPad(Width::W32))
                .key("id", Encoder::ZeroPad(Width::W32)),
        )
        .register(
            EntityDescriptor::of::<Order>()
                .key("customer", Encoder::Identity)
                .key("id", Encoder::ReverseZeroPad(Width::W64)),
        )
        .register(
            EntityDescriptor::of::<OrderLine>()
                .key("order", Encoder::ZeroPad(Width::W64))
                .key("line", Encoder::ZeroPad(Width::W32)),
        )
        .build()
        .unwrap()
}
