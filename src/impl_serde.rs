//! `serde::Serialize` for the model, so harnesses can dump it in whatever
//! format they diff against a parser's output. Datetimes serialize as their
//! canonical RFC 3339 text.

use crate::value::{Table, Value};
use serde::ser::{SerializeMap, SerializeSeq};

impl serde::Serialize for Value {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::String(s) => ser.serialize_str(s),
            Value::Integer(i) => {
                if let Ok(small) = i64::try_from(*i) {
                    ser.serialize_i64(small)
                } else {
                    ser.serialize_i128(*i)
                }
            }
            Value::Float(f) => ser.serialize_f64(*f),
            Value::Boolean(b) => ser.serialize_bool(*b),
            Value::Datetime(dt) => ser.collect_str(dt),
            Value::Array(arr) => {
                let mut seq = ser.serialize_seq(Some(arr.len()))?;
                for ele in arr {
                    seq.serialize_element(ele)?;
                }
                seq.end()
            }
            Value::Table(tab) => tab.serialize(ser),
        }
    }
}

impl serde::Serialize for Table {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = ser.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
