//! Integration tests for the scalar value type.

use std::collections::HashMap;

use stowage_foundation::{Value, ValueKind};

#[test]
fn values_key_hash_containers() {
    // Local data and replicas key hash maps by value-bearing types; float
    // bit-equality keeps that sound even for NaN.
    let mut map = HashMap::new();
    map.insert(Value::Float(f64::NAN), "nan");
    map.insert(Value::Int(1), "one");
    map.insert(Value::from("one"), "string-one");

    assert_eq!(map.get(&Value::Float(f64::NAN)), Some(&"nan"));
    assert_eq!(map.get(&Value::Int(1)), Some(&"one"));
    assert_eq!(map.get(&Value::from("one")), Some(&"string-one"));
    assert_eq!(map.len(), 3);
}

#[test]
fn conversions_cover_primitive_types() {
    assert_eq!(Value::from(true).kind(), ValueKind::Bool);
    assert_eq!(Value::from(3i32), Value::Int(3));
    assert_eq!(Value::from(3i64), Value::Int(3));
    assert_eq!(Value::from(0.5).kind(), ValueKind::Float);
    assert_eq!(Value::from(String::from("x")), Value::from("x"));
}

#[test]
fn string_values_share_storage() {
    let a = Value::from("shared");
    let b = a.clone();

    // Cloning a string value clones the Arc, not the bytes.
    match (&a, &b) {
        (Value::String(left), Value::String(right)) => {
            assert!(std::sync::Arc::ptr_eq(left, right));
        }
        _ => unreachable!(),
    }
}

#[test]
fn display_is_plain() {
    assert_eq!(format!("{}", Value::Int(42)), "42");
    assert_eq!(format!("{}", Value::Bool(false)), "false");
    assert_eq!(format!("{}", Value::from("knife")), "knife");
    // Debug quotes strings, display does not.
    assert_eq!(format!("{:?}", Value::from("knife")), "\"knife\"");
}
