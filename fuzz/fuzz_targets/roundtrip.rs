#![no_main]

use libfuzzer_sys::fuzz_target;
use toml_fuzzgen::{Config, Datetime, Table, TimeOffset, Value};

fuzz_target!(|data: &[u8]| {
    let Some(seed_bytes) = data.get(..8) else {
        return;
    };
    let seed = u64::from_le_bytes(seed_bytes.try_into().unwrap());

    // The toml crate stores integers as i64, so cap the magnitude.
    let config = Config {
        max_int_value: 1 << 62,
        ..Config::default()
    };
    let out = toml_fuzzgen::generate_with(seed, config);

    let parsed: toml::Table = match out.document.parse() {
        Ok(table) => table,
        Err(err) => panic!(
            "toml rejected a generated document (seed {seed})!\n\
             error: {err}\n\
             input:\n{}",
            out.document
        ),
    };

    let model = out.model.as_table().expect("model is always a table");
    assert!(
        tables_match(model, &parsed),
        "parsed value differs from model (seed {seed})!\n\
         input:\n{}\n\
         model: {:?}\n\
         parsed: {parsed:?}",
        out.document,
        out.model
    );
});

/// Recursive comparison between the generated model and a `toml::Table`.
/// Tables compare by key set, arrays elementwise, floats with sign-aware
/// zero and NaN-matches-NaN semantics.
fn tables_match(model: &Table, parsed: &toml::Table) -> bool {
    model.len() == parsed.len()
        && model
            .entries()
            .iter()
            .all(|(k, v)| parsed.get(k).is_some_and(|pv| values_match(v, pv)))
}

fn values_match(model: &Value, parsed: &toml::Value) -> bool {
    match (model, parsed) {
        (Value::String(a), toml::Value::String(b)) => a == b,
        (Value::Integer(a), toml::Value::Integer(b)) => *a == *b as i128,
        (Value::Float(a), toml::Value::Float(b)) => {
            (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
        }
        (Value::Boolean(a), toml::Value::Boolean(b)) => a == b,
        (Value::Datetime(a), toml::Value::Datetime(b)) => datetimes_match(a, b),
        (Value::Array(a), toml::Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_match(x, y))
        }
        (Value::Table(a), toml::Value::Table(b)) => tables_match(a, b),
        _ => false,
    }
}

fn datetimes_match(model: &Datetime, parsed: &toml::value::Datetime) -> bool {
    let (date, time, offset) = match model {
        Datetime::Offset { date, time, offset } => (Some(*date), Some(*time), Some(*offset)),
        Datetime::Local { date, time } => (Some(*date), Some(*time), None),
        Datetime::LocalDate(date) => (Some(*date), None, None),
        Datetime::LocalTime(time) => (None, Some(*time), None),
    };
    let date_ok = match (date, parsed.date) {
        (Some(d), Some(p)) => (d.year, d.month, d.day) == (p.year, p.month, p.day),
        (None, None) => true,
        _ => false,
    };
    let time_ok = match (time, parsed.time) {
        (Some(t), Some(p)) => {
            (t.hour, t.minute, t.second, t.microsecond * 1000)
                == (p.hour, p.minute, p.second, p.nanosecond)
        }
        (None, None) => true,
        _ => false,
    };
    let offset_ok = match (offset, parsed.offset) {
        (Some(TimeOffset::Z), Some(toml::value::Offset::Z)) => true,
        (
            Some(TimeOffset::Custom { minutes }),
            Some(toml::value::Offset::Custom { minutes: theirs }),
        ) => minutes == theirs,
        (None, None) => true,
        _ => false,
    };
    date_ok && time_ok && offset_ok
}
