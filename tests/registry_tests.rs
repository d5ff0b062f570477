//! Tests for Registry
//!
//! These tests verify:
//! - must_* / try_* CRUD semantics and their error kinds
//! - Key arity and schema errors
//! - Type and partial-key scans, including key ordering
//! - Selection pipelines over query results
//! - Codec selection and corrupt buffers

mod common;

use common::{init_tracing, schema, Customer, Order, OrderLine, Unregistered};
use entitykv::{
    AttrValue, BincodeCodec, EntityKvError, ErrorKind, MemoryStore, Registry, Schema, Store,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (MemoryStore, Schema) {
    init_tracing();
    (MemoryStore::new(), schema())
}

fn order(customer: &str, id: u64, amount: u32) -> Order {
    Order {
        id,
        customer: customer.to_string(),
        amount,
    }
}

fn key(parts: &[AttrValue]) -> Vec<AttrValue> {
    parts.to_vec()
}

// =============================================================================
// Create / Read Tests
// =============================================================================

#[test]
fn test_create_then_read() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let alice = Customer::new(1, 7, "alice", 100);
    registry.must_create(&alice).unwrap();

    let read: Customer = registry.must_read(&alice.key_parts()).unwrap();
    assert_eq!(read, alice);
}

#[test]
fn test_create_writes_composite_key() {
    let (mut store, schema) = setup();
    Registry::new(&mut store, &schema)
        .must_create(&Customer::new(1, 7, "alice", 100))
        .unwrap();

    assert_eq!(
        store.keys(),
        vec!["\u{0}CUSTOMER\u{0}0000000001\u{0}0000000007\u{0}".to_string()]
    );
}

#[test]
fn test_double_create_fails() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let alice = Customer::new(1, 7, "alice", 100);
    registry.must_create(&alice).unwrap();

    let err = registry
        .must_create(&Customer::new(1, 7, "imposter", 0))
        .unwrap_err();
    assert!(matches!(err, EntityKvError::EntityExists { .. }));
    assert!(err.is_business());

    assert!(!registry.try_create(&alice).unwrap());

    let read: Customer = registry.must_read(&alice.key_parts()).unwrap();
    assert_eq!(read.name, "alice");
}

#[test]
fn test_read_missing_entity() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let parts = key(&[1u32.into(), 99u32.into()]);
    let err = registry.must_read::<Customer>(&parts).unwrap_err();
    assert!(matches!(err, EntityKvError::EntityNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Business);

    assert_eq!(registry.try_read::<Customer>(&parts).unwrap(), None);
}

#[test]
fn test_empty_buffer_counts_as_absent() {
    let (mut store, schema) = setup();
    let alice = Customer::new(1, 7, "alice", 100);
    let stored_key = schema.descriptor::<Customer>().unwrap().key_of(&alice).unwrap();
    store.put(stored_key.as_str(), b"").unwrap();

    let mut registry = Registry::new(&mut store, &schema);
    assert!(!registry.exists(&alice).unwrap());
    assert_eq!(registry.try_read::<Customer>(&alice.key_parts()).unwrap(), None);
    registry.must_create(&alice).unwrap();
}

// =============================================================================
// Update / Delete Tests
// =============================================================================

#[test]
fn test_update_before_create_fails() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let alice = Customer::new(1, 7, "alice", 100);
    let err = registry.must_update(&alice).unwrap_err();
    assert!(matches!(err, EntityKvError::EntityNotFound { .. }));
    assert!(!registry.try_update(&alice).unwrap());
    assert!(!registry.exists(&alice).unwrap());
}

#[test]
fn test_update_replaces_value() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let mut alice = Customer::new(1, 7, "alice", 100);
    registry.must_create(&alice).unwrap();
    alice.balance = 250;
    assert!(registry.try_update(&alice).unwrap());

    let read: Customer = registry.must_read(&alice.key_parts()).unwrap();
    assert_eq!(read.balance, 250);
}

#[test]
fn test_delete_then_read() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let alice = Customer::new(1, 7, "alice", 100);
    registry.must_create(&alice).unwrap();
    registry.must_delete(&alice).unwrap();

    assert_eq!(registry.try_read::<Customer>(&alice.key_parts()).unwrap(), None);
    assert!(matches!(
        registry.must_delete(&alice),
        Err(EntityKvError::EntityNotFound { .. })
    ));
    assert!(!registry.try_delete(&alice).unwrap());
    assert!(store.is_empty());
}

#[test]
fn test_try_operations_report_success() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let alice = Customer::new(1, 7, "alice", 100);
    assert!(registry.try_create(&alice).unwrap());
    assert!(registry.try_update(&alice).unwrap());
    assert!(registry.try_read::<Customer>(&alice.key_parts()).unwrap().is_some());
    assert!(registry.try_delete(&alice).unwrap());
}

// =============================================================================
// Key Error Tests
// =============================================================================

#[test]
fn test_read_with_wrong_arity() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let err = registry.must_read::<Customer>(&key(&[1u32.into()])).unwrap_err();
    assert!(matches!(
        err,
        EntityKvError::InvalidKeyArity {
            expected: 2,
            actual: 1,
            ..
        }
    ));

    // Never softened into a not-found outcome
    assert!(registry
        .try_read::<Customer>(&key(&[1u32.into(), 2u32.into(), 3u32.into()]))
        .is_err());
}

#[test]
fn test_unregistered_entity_type() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let err = registry.must_create(&Unregistered { id: 1 }).unwrap_err();
    assert!(matches!(err, EntityKvError::MissingPrimaryKey { ref entity_type } if entity_type == "UNREGISTERED"));
    assert!(registry.try_create(&Unregistered { id: 1 }).is_err());
    assert!(registry.read_all::<Unregistered>().is_err());
}

#[test]
fn test_invalid_key_value_is_rejected() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let err = registry
        .must_read::<Customer>(&key(&[(-1i64).into(), 1u32.into()]))
        .unwrap_err();
    assert!(matches!(err, EntityKvError::InvalidArgument(_)));
    assert_eq!(err.kind(), ErrorKind::CallerContract);
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_read_all_is_isolated_by_type() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    registry.must_create(&order("alice", 1, 10)).unwrap();
    registry.must_create(&OrderLine { order: 1, line: 1 }).unwrap();
    registry.must_create(&OrderLine { order: 1, line: 2 }).unwrap();
    registry.must_create(&Customer::new(1, 1, "alice", 0)).unwrap();

    let orders: Vec<Order> = registry.read_all().unwrap();
    assert_eq!(orders, vec![order("alice", 1, 10)]);

    let lines: Vec<OrderLine> = registry.read_all().unwrap();
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_zero_padded_keys_scan_in_numeric_order() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    for id in [10, 2, 300, 1] {
        registry.must_create(&Customer::new(1, id, "c", 0)).unwrap();
    }

    let ids: Vec<u32> = registry
        .read_all::<Customer>()
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 10, 300]);
}

#[test]
fn test_partial_key_with_reverse_ordering() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    for id in [1, 3, 2] {
        registry.must_create(&order("alice", id, 5)).unwrap();
    }
    registry.must_create(&order("bob", 9, 5)).unwrap();

    let ids: Vec<u64> = registry
        .read_by_partial_key::<Order>(&key(&["alice".into()]))
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let all: Vec<Order> = registry.read_by_partial_key(&[]).unwrap();
    assert_eq!(all.len(), 4);
}

#[test]
fn test_partial_key_with_too_many_parts() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    let parts = key(&["alice".into(), 1u64.into(), 2u64.into()]);
    assert!(matches!(
        registry.read_by_partial_key::<Order>(&parts),
        Err(EntityKvError::InvalidKeyArity { .. })
    ));
}

#[test]
fn test_read_all_empty() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    assert!(registry.read_all::<Customer>().unwrap().is_empty());
    assert!(registry.select::<Customer>().unwrap().is_empty());
}

// =============================================================================
// Selection Tests
// =============================================================================

#[test]
fn test_select_sort_descending_first() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    registry.must_create(&Customer::new(1, 1, "a", 2)).unwrap();
    registry.must_create(&Customer::new(1, 2, "b", 3)).unwrap();
    registry.must_create(&Customer::new(1, 3, "c", 1)).unwrap();

    let richest = registry
        .select::<Customer>()
        .unwrap()
        .sorted_by_key(|c| c.balance)
        .descending()
        .into_first()
        .unwrap();
    assert_eq!(richest.balance, 3);
    assert_eq!(richest.name, "b");
}

#[test]
fn test_select_matching() {
    let (mut store, schema) = setup();
    let mut registry = Registry::new(&mut store, &schema);

    for (id, amount) in [(1, 50), (2, 500), (3, 5000)] {
        registry.must_create(&order("alice", id, amount)).unwrap();
    }

    let large = registry
        .select::<Order>()
        .unwrap()
        .matching(|o| o.amount >= 500)
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .into_vec();
    assert_eq!(large.iter().map(|o| o.id).collect::<Vec<_>>(), vec![2, 3]);
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_bincode_codec_round_trip() {
    let (mut store, schema) = setup();
    let mut registry = Registry::with_codec(&mut store, &schema, BincodeCodec);

    let alice = Customer::new(2, 5, "alice", -40);
    registry.must_create(&alice).unwrap();

    let read: Customer = registry.must_read(&alice.key_parts()).unwrap();
    assert_eq!(read, alice);
}

#[test]
fn test_corrupt_buffer_is_serialization_error() {
    let (mut store, schema) = setup();
    let alice = Customer::new(1, 7, "alice", 100);
    let stored_key = schema.descriptor::<Customer>().unwrap().key_of(&alice).unwrap();
    store.put(stored_key.as_str(), b"{not json").unwrap();

    let mut registry = Registry::new(&mut store, &schema);
    let err = registry.must_read::<Customer>(&alice.key_parts()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert!(registry.read_all::<Customer>().is_err());
}
