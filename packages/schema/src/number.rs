//! JSON output for pixel and scale values.
//!
//! Values are held as `f64`, but whole numbers are written without a
//! fractional part so a page read from disk is written back unchanged.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Largest magnitude an `f64` holds every integer up to
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

pub(crate) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

pub(crate) fn serialize_map<K, S>(map: &BTreeMap<K, f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    K: Serialize,
    S: Serializer,
{
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (key, value) in map {
        out.serialize_entry(key, &Number(*value))?;
    }
    out.end()
}

struct Number(f64);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(&self.0, serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        #[serde(serialize_with = "serialize")]
        value: f64,
    }

    fn write(value: f64) -> serde_json::Value {
        serde_json::to_value(Sample { value }).unwrap()["value"].clone()
    }

    #[test]
    fn test_whole_numbers_drop_fraction() {
        assert_eq!(write(12.0), json!(12));
        assert_eq!(write(-4.0), json!(-4));
        assert_eq!(write(0.0), json!(0));
    }

    #[test]
    fn test_fractions_are_kept() {
        assert_eq!(write(1.05), json!(1.05));
        assert_eq!(write(1e300), json!(1e300));
    }
}
