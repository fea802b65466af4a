//! Terraform State Management
//!
//! Handles encoding and decoding of Terraform values. Terraform sends and
//! expects msgpack following cty conventions: objects are string keyed maps,
//! lists and sets are arrays, and unknown values are msgpack extension 0.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use rmpv::Value as Msgpack;
use serde_json::Value as Json;

use crate::tfplugin6;

/// Extension type cty uses for unknown values
const UNKNOWN_EXT: i8 = 0;
/// Extension type of refined unknown values sent by newer Terraform releases
const REFINED_UNKNOWN_EXT: i8 = 12;

static NULL: DynamicValue = DynamicValue::Null;

/// Dynamic value exchanged with Terraform
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DynamicValue {
    #[default]
    Null,
    /// Not known until apply
    Unknown,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<DynamicValue>),
    Map(HashMap<String, DynamicValue>),
}

impl DynamicValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DynamicValue::Unknown)
    }

    /// True when neither the value nor anything nested in it is unknown
    pub fn is_wholly_known(&self) -> bool {
        match self {
            DynamicValue::Unknown => false,
            DynamicValue::List(items) => items.iter().all(DynamicValue::is_wholly_known),
            DynamicValue::Map(map) => map.values().all(DynamicValue::is_wholly_known),
            _ => true,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            DynamicValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Number(n) => n.as_f64(),
            DynamicValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, DynamicValue>> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map()?.get(key)
    }

    /// Attribute value, null when missing
    pub fn attr(&self, key: &str) -> &DynamicValue {
        self.get(key).unwrap_or(&NULL)
    }

    /// Set `key` on an object value; no-op for anything else
    pub fn insert(&mut self, key: impl Into<String>, value: DynamicValue) {
        if let DynamicValue::Map(map) = self {
            map.insert(key.into(), value);
        }
    }

    /// Convert a JSON value; JSON has no notion of unknown
    pub fn from_json(value: Json) -> Self {
        match value {
            Json::Null => DynamicValue::Null,
            Json::Bool(b) => DynamicValue::Bool(b),
            Json::Number(n) => DynamicValue::Number(n),
            Json::String(s) => DynamicValue::String(s),
            Json::Array(items) => {
                DynamicValue::List(items.into_iter().map(DynamicValue::from_json).collect())
            }
            Json::Object(map) => DynamicValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, DynamicValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to JSON; unknown values become null
    pub fn to_json(&self) -> Json {
        match self {
            DynamicValue::Null | DynamicValue::Unknown => Json::Null,
            DynamicValue::Bool(b) => Json::Bool(*b),
            DynamicValue::Number(n) => Json::Number(n.clone()),
            DynamicValue::String(s) => Json::String(s.clone()),
            DynamicValue::List(items) => Json::Array(items.iter().map(|v| v.to_json()).collect()),
            DynamicValue::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Decode a Terraform DynamicValue from msgpack bytes
pub fn decode_dynamic_value(data: &[u8]) -> Result<DynamicValue> {
    if data.is_empty() {
        return Ok(DynamicValue::Null);
    }
    let value = rmpv::decode::read_value(&mut &data[..])?;
    from_msgpack(value)
}

/// Encode a value to Terraform DynamicValue msgpack bytes
pub fn encode_dynamic_value(value: &DynamicValue) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &to_msgpack(value))?;
    Ok(buf)
}

/// Decode the protocol wrapper, accepting either encoding
pub fn decode_wire(value: Option<&tfplugin6::DynamicValue>) -> Result<DynamicValue> {
    match value {
        None => Ok(DynamicValue::Null),
        Some(v) if !v.msgpack.is_empty() => decode_dynamic_value(&v.msgpack),
        Some(v) if !v.json.is_empty() => decode_json(&v.json),
        Some(_) => Ok(DynamicValue::Null),
    }
}

/// Encode into the protocol wrapper
pub fn encode_wire(value: &DynamicValue) -> Result<tfplugin6::DynamicValue> {
    Ok(tfplugin6::DynamicValue {
        msgpack: encode_dynamic_value(value)?,
        json: vec![],
    })
}

/// Decode a JSON document such as a raw state
pub fn decode_json(data: &[u8]) -> Result<DynamicValue> {
    let json: Json = serde_json::from_slice(data)?;
    Ok(DynamicValue::from_json(json))
}

fn from_msgpack(value: Msgpack) -> Result<DynamicValue> {
    Ok(match value {
        Msgpack::Nil => DynamicValue::Null,
        Msgpack::Boolean(b) => DynamicValue::Bool(b),
        Msgpack::Integer(i) => {
            if let Some(n) = i.as_i64() {
                DynamicValue::Number(n.into())
            } else if let Some(n) = i.as_u64() {
                DynamicValue::Number(n.into())
            } else {
                bail!("integer out of range")
            }
        }
        Msgpack::F32(f) => float_value(f as f64),
        Msgpack::F64(f) => float_value(f),
        Msgpack::String(s) => match s.into_str() {
            Some(s) => DynamicValue::String(s),
            None => bail!("string is not valid UTF-8"),
        },
        Msgpack::Binary(bytes) => DynamicValue::String(String::from_utf8_lossy(&bytes).into_owned()),
        Msgpack::Array(items) => DynamicValue::List(
            items
                .into_iter()
                .map(from_msgpack)
                .collect::<Result<Vec<_>>>()?,
        ),
        Msgpack::Map(entries) => {
            let mut map = HashMap::with_capacity(entries.len());
            for (key, value) in entries {
                let key = match key {
                    Msgpack::String(s) => s
                        .into_str()
                        .ok_or_else(|| anyhow!("map key is not valid UTF-8"))?,
                    other => bail!("unsupported map key {}", other),
                };
                map.insert(key, from_msgpack(value)?);
            }
            DynamicValue::Map(map)
        }
        Msgpack::Ext(UNKNOWN_EXT, _) | Msgpack::Ext(REFINED_UNKNOWN_EXT, _) => DynamicValue::Unknown,
        Msgpack::Ext(kind, _) => bail!("unsupported msgpack extension type {}", kind),
    })
}

fn to_msgpack(value: &DynamicValue) -> Msgpack {
    match value {
        DynamicValue::Null => Msgpack::Nil,
        DynamicValue::Unknown => Msgpack::Ext(UNKNOWN_EXT, vec![0]),
        DynamicValue::Bool(b) => Msgpack::Boolean(*b),
        DynamicValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Msgpack::from(i)
            } else if let Some(u) = n.as_u64() {
                Msgpack::from(u)
            } else {
                Msgpack::F64(n.as_f64().unwrap_or_default())
            }
        }
        DynamicValue::String(s) => Msgpack::from(s.as_str()),
        DynamicValue::List(items) => Msgpack::Array(items.iter().map(to_msgpack).collect()),
        DynamicValue::Map(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Msgpack::Map(
                keys.into_iter()
                    .map(|k| (Msgpack::from(k.as_str()), to_msgpack(&map[k])))
                    .collect(),
            )
        }
    }
}

/// Helper to extract a string attribute from a DynamicValue
pub fn get_string_attr(value: &DynamicValue, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_string())
        .unwrap_or("")
        .to_string()
}

/// Helper to extract an optional string attribute from a DynamicValue
pub fn get_optional_string_attr(value: &DynamicValue, key: &str) -> Option<String> {
    value.get(key).and_then(|v| match v {
        DynamicValue::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// Helper to extract an integer attribute from a DynamicValue
pub fn get_int_attr(value: &DynamicValue, key: &str, default: i64) -> i64 {
    value.get(key).and_then(|v| v.as_i64()).unwrap_or(default)
}

/// Helper to extract an optional integer attribute
pub fn get_optional_int_attr(value: &DynamicValue, key: &str) -> Option<i64> {
    value.get(key).and_then(|v| v.as_i64())
}

/// Helper to extract a bool attribute from a DynamicValue
pub fn get_bool_attr(value: &DynamicValue, key: &str, default: bool) -> bool {
    value.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

/// Helper to extract an optional bool attribute
pub fn get_optional_bool_attr(value: &DynamicValue, key: &str) -> Option<bool> {
    value.get(key).and_then(|v| v.as_bool())
}

/// Helper to extract a list or set of strings
pub fn get_string_list_attr(value: &DynamicValue, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_list())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_string().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Helper to extract a map of strings
pub fn get_string_map_attr(value: &DynamicValue, key: &str) -> HashMap<String, String> {
    value
        .get(key)
        .and_then(|v| v.as_map())
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_string().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Objects of a nested block (list, set or single)
pub fn get_blocks<'a>(value: &'a DynamicValue, key: &str) -> Vec<&'a DynamicValue> {
    match value.get(key) {
        Some(DynamicValue::List(items)) => items.iter().filter(|i| !i.is_null()).collect(),
        Some(single @ DynamicValue::Map(_)) => vec![single],
        _ => Vec::new(),
    }
}

/// First object of a nested block, if any
pub fn get_block<'a>(value: &'a DynamicValue, key: &str) -> Option<&'a DynamicValue> {
    get_blocks(value, key).into_iter().next()
}

/// Create a DynamicValue map with the given attributes
pub fn make_state(attrs: Vec<(&str, DynamicValue)>) -> DynamicValue {
    let mut map = HashMap::new();
    for (key, value) in attrs {
        map.insert(key.to_string(), value);
    }
    DynamicValue::Map(map)
}

/// Create a string DynamicValue
pub fn string_value(s: impl Into<String>) -> DynamicValue {
    DynamicValue::String(s.into())
}

/// String value, or null when absent or empty
pub fn opt_string_value(s: Option<impl Into<String>>) -> DynamicValue {
    match s.map(Into::into) {
        Some(s) if !s.is_empty() => DynamicValue::String(s),
        _ => DynamicValue::Null,
    }
}

/// Create a number DynamicValue from i64
pub fn int_value(n: i64) -> DynamicValue {
    DynamicValue::Number(serde_json::Number::from(n))
}

pub fn opt_int_value(n: Option<i64>) -> DynamicValue {
    n.map(int_value).unwrap_or(DynamicValue::Null)
}

/// Create a number DynamicValue from f64
pub fn float_value(n: f64) -> DynamicValue {
    serde_json::Number::from_f64(n)
        .map(DynamicValue::Number)
        .unwrap_or(DynamicValue::Null)
}

/// Create a bool DynamicValue
pub fn bool_value(b: bool) -> DynamicValue {
    DynamicValue::Bool(b)
}

pub fn opt_bool_value(b: Option<bool>) -> DynamicValue {
    b.map(DynamicValue::Bool).unwrap_or(DynamicValue::Null)
}

/// Create a list of strings
pub fn string_list_value<I, S>(items: I) -> DynamicValue
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    DynamicValue::List(items.into_iter().map(string_value).collect())
}

/// Create a map of strings
pub fn string_map_value(map: &HashMap<String, String>) -> DynamicValue {
    DynamicValue::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), string_value(v)))
            .collect(),
    )
}

/// Create a null DynamicValue
pub fn null_value() -> DynamicValue {
    DynamicValue::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: &DynamicValue) -> DynamicValue {
        decode_dynamic_value(&encode_dynamic_value(value).unwrap()).unwrap()
    }

    #[test]
    fn test_nested_values_survive_msgpack() {
        let value = make_state(vec![
            ("id", DynamicValue::Unknown),
            ("name", string_value("web")),
            ("count", int_value(3)),
            ("ratio", float_value(0.5)),
            ("enabled", bool_value(true)),
            ("description", null_value()),
            ("zones", DynamicValue::List(vec![make_state(vec![("priority", int_value(1))])])),
        ]);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn test_unknown_is_extension_zero() {
        let bytes = encode_dynamic_value(&DynamicValue::Unknown).unwrap();
        assert_eq!(bytes, vec![0xd4, 0x00, 0x00]);
        assert_eq!(decode_dynamic_value(&bytes).unwrap(), DynamicValue::Unknown);
    }

    #[test]
    fn test_refined_unknown_is_accepted() {
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &Msgpack::Ext(12, vec![0x81, 0x01, 0xc3])).unwrap();
        assert_eq!(decode_dynamic_value(&buf).unwrap(), DynamicValue::Unknown);
    }

    #[test]
    fn test_empty_payload_is_null() {
        assert_eq!(decode_dynamic_value(&[]).unwrap(), DynamicValue::Null);
        assert_eq!(decode_wire(None).unwrap(), DynamicValue::Null);
    }

    #[test]
    fn test_json_raw_state_decodes() {
        let state = decode_json(br#"{"id":"p-1","name":"alpha","shared_resources":true,"zones":[]}"#)
            .unwrap();
        assert_eq!(get_string_attr(&state, "id"), "p-1");
        assert!(get_bool_attr(&state, "shared_resources", false));
        assert_eq!(state.get("zones"), Some(&DynamicValue::List(vec![])));
    }

    #[test]
    fn test_wire_prefers_msgpack_then_json() {
        let wire = tfplugin6::DynamicValue {
            msgpack: vec![],
            json: br#"{"id":"x"}"#.to_vec(),
        };
        let value = decode_wire(Some(&wire)).unwrap();
        assert_eq!(get_string_attr(&value, "id"), "x");
    }

    #[test]
    fn test_attribute_helpers() {
        let value = make_state(vec![
            ("capacity", string_value("8")),
            ("tags", string_list_value(["a", "b"])),
            ("empty", string_value("")),
        ]);
        assert_eq!(get_int_attr(&value, "capacity", 0), 8);
        assert_eq!(get_string_list_attr(&value, "tags"), vec!["a", "b"]);
        assert_eq!(get_optional_string_attr(&value, "empty"), None);
        assert_eq!(get_optional_string_attr(&value, "missing"), None);
    }

    #[test]
    fn test_wholly_known() {
        let partial = make_state(vec![("a", DynamicValue::List(vec![DynamicValue::Unknown]))]);
        assert!(!partial.is_wholly_known());
        assert!(make_state(vec![("a", int_value(1))]).is_wholly_known());
    }
}
