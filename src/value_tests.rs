use super::{Table, Value, floats_equivalent};
use crate::time::{Date, Datetime};

#[test]
fn table_preserves_insertion_order() {
    let mut t = Table::new();
    t.insert("zebra".into(), Value::Integer(1));
    t.insert("apple".into(), Value::Integer(2));
    t.insert("mango".into(), Value::Integer(3));
    let keys: Vec<&str> = t.entries().iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["zebra", "apple", "mango"]);
}

#[test]
fn table_lookup() {
    let mut t = Table::new();
    t.insert("a".into(), Value::Boolean(true));
    assert!(t.contains_key("a"));
    assert!(!t.contains_key("b"));
    assert_eq!(t.len(), 1);
    match t.get("a") {
        Some(Value::Boolean(true)) => {}
        other => panic!("unexpected lookup result: {other:?}"),
    }
}

#[test]
fn table_get_mut_updates_in_place() {
    let mut t = Table::new();
    t.insert("n".into(), Value::Integer(1));
    *t.get_mut("n").unwrap() = Value::Integer(2);
    assert_eq!(t.get("n"), Some(&Value::Integer(2)));
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "duplicate key")]
fn table_rejects_duplicate_key() {
    let mut t = Table::new();
    t.insert("k".into(), Value::Integer(1));
    t.insert("k".into(), Value::Integer(2));
}

#[test]
fn float_equivalence_nan_by_sign() {
    assert!(floats_equivalent(f64::NAN, f64::NAN));
    assert!(floats_equivalent(-f64::NAN, -f64::NAN));
    assert!(!floats_equivalent(f64::NAN, -f64::NAN));
    assert!(!floats_equivalent(f64::NAN, 1.0));
}

#[test]
fn float_equivalence_signed_zero() {
    assert!(floats_equivalent(0.0, 0.0));
    assert!(floats_equivalent(-0.0, -0.0));
    assert!(!floats_equivalent(0.0, -0.0));
}

#[test]
fn float_equivalence_ordinary() {
    assert!(floats_equivalent(1.5, 1.5));
    assert!(floats_equivalent(f64::INFINITY, f64::INFINITY));
    assert!(!floats_equivalent(f64::INFINITY, f64::NEG_INFINITY));
    assert!(!floats_equivalent(1.5, 2.5));
}

#[test]
fn value_eq_follows_float_rules() {
    assert_eq!(Value::Float(-f64::NAN), Value::Float(-f64::NAN));
    assert_ne!(Value::Float(f64::NAN), Value::Float(-f64::NAN));
    assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    assert_ne!(Value::Float(1.0), Value::Integer(1));
}

#[test]
fn value_eq_recurses_into_containers() {
    let a = Value::Array(vec![
        Value::String("x".into()),
        Value::Array(vec![Value::Float(f64::NAN)]),
    ]);
    let b = Value::Array(vec![
        Value::String("x".into()),
        Value::Array(vec![Value::Float(f64::NAN)]),
    ]);
    assert_eq!(a, b);

    let mut ta = Table::new();
    ta.insert("d".into(), a);
    let mut tb = Table::new();
    tb.insert("d".into(), b);
    assert_eq!(Value::Table(ta), Value::Table(tb));
}

#[test]
fn value_type_str() {
    let date = Datetime::LocalDate(Date {
        year: 2000,
        month: 1,
        day: 1,
    });
    assert_eq!(Value::String(String::new()).type_str(), "string");
    assert_eq!(Value::Integer(0).type_str(), "integer");
    assert_eq!(Value::Datetime(date).type_str(), "datetime");
    assert_eq!(Value::Table(Table::new()).type_str(), "table");
}
