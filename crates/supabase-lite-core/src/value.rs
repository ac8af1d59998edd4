use std::collections::HashMap;
use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{SupabaseError, SupabaseResult};

/// A dynamically-shaped JSON tree used for request and response payloads.
///
/// Every node owns its children, so dropping a value releases the whole subtree and
/// `clone()` produces a fully independent copy. Object key order is not preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(HashMap<String, JsonValue>),
}

impl JsonValue {
    /// Parse JSON text. Malformed input yields [`SupabaseError::Parse`].
    pub fn parse(text: &str) -> SupabaseResult<Self> {
        serde_json::from_str(text).map_err(|e| SupabaseError::parse(e.to_string()))
    }

    /// Parse JSON from raw bytes (e.g. a response body).
    pub fn from_slice(bytes: &[u8]) -> SupabaseResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| SupabaseError::parse(e.to_string()))
    }

    /// Serialize to compact JSON text.
    pub fn to_json_string(&self) -> String {
        self.to_string()
    }

    /// Serialize to compact JSON bytes, ready to be used as a request body.
    pub fn to_vec(&self) -> SupabaseResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Build a tree from any serializable value.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> SupabaseResult<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// Decode the tree into a fixed Rust type.
    ///
    /// Shape mismatches (missing fields, wrong types) yield [`SupabaseError::InvalidResponse`].
    pub fn deserialize_into<T: DeserializeOwned>(self) -> SupabaseResult<T> {
        serde_json::from_value(serde_json::Value::from(self))
            .map_err(|e| SupabaseError::invalid_response(e.to_string()))
    }

    /// Look up a key on an object. `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Look up an element of an array. `None` when out of bounds or not an array.
    pub fn get_index(&self, index: usize) -> Option<&JsonValue> {
        match self {
            Self::Array(items) => items.get(index),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value as `f64`; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<JsonValue>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, JsonValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Move the value out, leaving `Null` in its place.
    pub fn take(&mut self) -> JsonValue {
        std::mem::take(self)
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

// ── serde ────────────────────────────────────────────────────────────────────

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

struct JsonValueVisitor;

impl<'de> Visitor<'de> for JsonValueVisitor {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any valid JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JsonValue, E> {
        Ok(JsonValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonValue, E> {
        Ok(JsonValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonValue, E> {
        // Integers beyond i64 are kept as floats rather than rejected.
        Ok(match i64::try_from(v) {
            Ok(n) => JsonValue::Integer(n),
            Err(_) => JsonValue::Float(v as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JsonValue, E> {
        Ok(JsonValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<JsonValue, D::Error> {
        JsonValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsonValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<JsonValue, A::Error> {
        let mut map = HashMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, JsonValue>()? {
            map.insert(key, value);
        }
        Ok(JsonValue::Object(map))
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonValueVisitor)
    }
}

// ── serde_json interop ───────────────────────────────────────────────────────

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<JsonValue> for serde_json::Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Integer(n) => Self::Number(n.into()),
            JsonValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Self::Number)
                .unwrap_or(Self::Null),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

// ── Literal conversions ──────────────────────────────────────────────────────

impl From<bool> for JsonValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for JsonValue {
                fn from(v: $t) -> Self {
                    Self::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for JsonValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(n) => Self::Integer(n),
            Err(_) => Self::Float(v as f64),
        }
    }
}

impl From<usize> for JsonValue {
    fn from(v: usize) -> Self {
        Self::from(v as u64)
    }
}

impl From<f32> for JsonValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for JsonValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for JsonValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for JsonValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl<T: Into<JsonValue>> From<Vec<T>> for JsonValue {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<JsonValue>> From<Option<T>> for JsonValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl<T: Into<JsonValue>> From<HashMap<String, T>> for JsonValue {
    fn from(v: HashMap<String, T>) -> Self {
        Self::Object(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl FromIterator<JsonValue> for JsonValue {
    fn from_iter<I: IntoIterator<Item = JsonValue>>(iter: I) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for JsonValue {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        Self::Object(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Macro for constructing a [`JsonValue::Object`] from key-value pairs.
///
/// # Examples
/// ```
/// use supabase_lite_core::object;
/// let row = object![("name", "Auckland"), ("country_id", 554)];
/// assert_eq!(row.get("country_id").and_then(|v| v.as_i64()), Some(554));
/// ```
#[macro_export]
macro_rules! object {
    () => {
        $crate::JsonValue::Object(::std::collections::HashMap::new())
    };
    ($(($key:expr, $val:expr)),+ $(,)?) => {{
        let mut map = ::std::collections::HashMap::new();
        $(
            map.insert(::std::string::String::from($key), $crate::JsonValue::from($val));
        )+
        $crate::JsonValue::Object(map)
    }};
}
