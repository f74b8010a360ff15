//! Serde adapter for floats that may hold infinite sentinels
//!
//! JSON has no representation for non-finite numbers and `serde_json` writes
//! them as `null`. Fields using `#[serde(with = "vf_core::serde_float")]` write
//! them as the strings `"inf"`, `"-inf"` and `"nan"` instead; finite values
//! stay plain numbers.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

const INFINITY: &str = "inf";
const NEG_INFINITY: &str = "-inf";
const NAN: &str = "nan";

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match *value {
        v if v.is_finite() => serializer.serialize_f64(v),
        v if v.is_nan() => serializer.serialize_str(NAN),
        v if v > 0.0 => serializer.serialize_str(INFINITY),
        _ => serializer.serialize_str(NEG_INFINITY),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Text(String),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Repr::deserialize(deserializer)? {
        Repr::Number(value) => Ok(value),
        Repr::Text(text) => match text.as_str() {
            INFINITY => Ok(f64::INFINITY),
            NEG_INFINITY => Ok(f64::NEG_INFINITY),
            NAN => Ok(f64::NAN),
            other => Err(D::Error::custom(format!(
                "expected a number, \"{INFINITY}\", \"{NEG_INFINITY}\" or \"{NAN}\", got {other:?}"
            ))),
        },
    }
}
