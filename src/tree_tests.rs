use super::{Context, KeyPath};
use crate::value::Value;

fn key(segs: &[&str]) -> KeyPath {
    segs.iter().map(|s| s.to_string()).collect()
}

fn table_keys(v: &Value) -> Vec<String> {
    v.as_table()
        .expect("expected a table")
        .entries()
        .iter()
        .map(|(k, _)| k.clone())
        .collect()
}

#[test]
fn assign_at_root() {
    let mut ctx = Context::new();
    ctx.assign(&key(&["answer"]), Value::Integer(42));
    let model = ctx.finalize();
    let tbl = model.as_table().unwrap();
    assert_eq!(tbl.len(), 1);
    assert_eq!(tbl.get("answer"), Some(&Value::Integer(42)));
}

#[test]
fn dotted_assignment_builds_nested_tables() {
    let mut ctx = Context::new();
    ctx.assign(&key(&["a", "b", "c"]), Value::Boolean(true));
    let model = ctx.finalize();
    let a = model.as_table().unwrap().get("a").unwrap();
    let b = a.as_table().unwrap().get("b").unwrap();
    assert_eq!(b.as_table().unwrap().get("c"), Some(&Value::Boolean(true)));
}

#[test]
fn repeated_array_header_appends_elements() {
    let mut ctx = Context::new();
    ctx.open_table_array(&key(&["a"]));
    ctx.open_table_array(&key(&["a"]));
    ctx.assign(&key(&["in_second"]), Value::Integer(1));
    let model = ctx.finalize();
    let arr = model.as_table().unwrap().get("a").unwrap();
    let elems = arr.as_array().unwrap();
    assert_eq!(elems.len(), 2);
    assert!(elems[0].as_table().unwrap().is_empty());
    assert!(elems[1].as_table().unwrap().contains_key("in_second"));
}

#[test]
fn header_descends_into_last_array_element() {
    let mut ctx = Context::new();
    ctx.open_table_array(&key(&["arr"]));
    ctx.open_table(&key(&["arr", "sub"]));
    ctx.assign(&key(&["x"]), Value::Integer(7));
    ctx.open_table_array(&key(&["arr"]));
    let model = ctx.finalize();
    let elems = model
        .as_table()
        .unwrap()
        .get("arr")
        .unwrap()
        .as_array()
        .unwrap()
        .to_vec();
    let first = elems[0].as_table().unwrap();
    let sub = first.get("sub").unwrap().as_table().unwrap();
    assert_eq!(sub.get("x"), Some(&Value::Integer(7)));
    assert!(elems[1].as_table().unwrap().is_empty());
}

#[test]
fn implicit_table_promoted_once() {
    let mut ctx = Context::new();
    ctx.open_table(&key(&["a", "b"]));
    // `a` exists only implicitly here.
    assert_eq!(
        ctx.all_table_keys(Some(false), Some(false)),
        vec![key(&["a"])]
    );
    ctx.open_table(&key(&["a"]));
    assert!(ctx.all_table_keys(Some(false), Some(false)).is_empty());
    let defined = ctx.all_table_keys(Some(true), Some(false));
    assert_eq!(defined, vec![key(&["a"]), key(&["a", "b"])]);
}

#[test]
fn active_queries_track_dotted_structure() {
    let mut ctx = Context::new();
    ctx.open_table(&key(&["top"]));
    ctx.assign(&key(&["plain"]), Value::Integer(0));
    ctx.assign(&key(&["deep", "inner", "leaf"]), Value::Integer(1));

    let mut items = ctx.active_item_keys();
    items.sort();
    assert_eq!(
        items,
        vec![key(&["deep", "inner", "leaf"]), key(&["plain"])]
    );

    let mut prefixes = ctx.active_item_prefixes();
    prefixes.sort();
    assert_eq!(prefixes, vec![key(&["deep"]), key(&["deep", "inner"])]);

    assert!(ctx.active_subtable_keys().is_empty());
}

#[test]
fn subtable_keys_see_headers_and_arrays() {
    let mut ctx = Context::new();
    ctx.open_table(&key(&["t", "sub"]));
    ctx.open_table_array(&key(&["t", "arr"]));
    ctx.open_table(&key(&["t"]));
    let mut subs = ctx.active_subtable_keys();
    subs.sort();
    assert_eq!(subs, vec![key(&["arr"]), key(&["sub"])]);
}

#[test]
fn item_keys_descend_only_into_last_array_element() {
    let mut ctx = Context::new();
    ctx.open_table_array(&key(&["a"]));
    ctx.assign(&key(&["hidden"]), Value::Integer(1));
    ctx.open_table_array(&key(&["a"]));
    ctx.assign(&key(&["visible"]), Value::Integer(2));
    let mut items = ctx.all_item_keys();
    items.sort();
    assert_eq!(items, vec![key(&["a", "visible"])]);
}

#[test]
fn table_key_filters() {
    let mut ctx = Context::new();
    ctx.open_table(&key(&["x", "y"]));
    ctx.open_table_array(&key(&["arr"]));

    let mut arrays = ctx.all_table_keys(None, Some(true));
    arrays.sort();
    assert_eq!(arrays, vec![key(&["arr"])]);

    let mut tables = ctx.all_table_keys(None, Some(false));
    tables.sort();
    assert_eq!(tables, vec![key(&["x"]), key(&["x", "y"])]);

    let all = ctx.all_table_keys(None, None);
    assert_eq!(all.len(), 3);
}

#[test]
fn inline_table_value_is_opaque() {
    let mut ctx = Context::new();
    let mut inner = crate::value::Table::new();
    inner.insert("k".into(), Value::Integer(1));
    ctx.assign(&key(&["inline"]), Value::Table(inner));
    // The inline table is a leaf; nothing below it is visible.
    assert_eq!(ctx.all_item_keys(), vec![key(&["inline"])]);
    assert!(ctx.all_table_keys(None, None).is_empty());
}

#[test]
fn finalize_is_idempotent() {
    let mut ctx = Context::new();
    ctx.assign(&key(&["f"]), Value::Float(f64::NAN));
    ctx.open_table(&key(&["t"]));
    ctx.assign(&key(&["n", "m"]), Value::Integer(3));
    assert_eq!(ctx.finalize(), ctx.finalize());
}

#[test]
fn finalize_preserves_insertion_order() {
    let mut ctx = Context::new();
    ctx.assign(&key(&["b"]), Value::Integer(1));
    ctx.assign(&key(&["a"]), Value::Integer(2));
    ctx.open_table(&key(&["c"]));
    assert_eq!(table_keys(&ctx.finalize()), ["b", "a", "c"]);
}

#[test]
#[should_panic(expected = "defined twice")]
fn redefining_table_panics() {
    let mut ctx = Context::new();
    ctx.open_table(&key(&["t"]));
    ctx.open_table(&key(&["t"]));
}

#[test]
#[should_panic(expected = "dotted table")]
fn header_on_dotted_table_panics() {
    let mut ctx = Context::new();
    ctx.assign(&key(&["a", "b"]), Value::Integer(1));
    ctx.open_table(&key(&["a"]));
}

#[test]
#[should_panic(expected = "assigned twice")]
fn duplicate_assignment_panics() {
    let mut ctx = Context::new();
    ctx.assign(&key(&["k"]), Value::Integer(1));
    ctx.assign(&key(&["k"]), Value::Integer(2));
}
