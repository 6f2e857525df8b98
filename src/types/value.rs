//! Variable values and their history entries
//!
//! A variable's history is a list of [`VarEntry`] values. Each entry is either
//! a live [`StoredValue`] or the [`VarValue::Deleted`] tombstone; the tombstone
//! is a distinct variant, so no real payload can ever be mistaken for it.

use serde::{Deserialize, Serialize};

use super::Stamp;

/// Opaque data held by a variable or an object record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// Raw bytes, base64 encoded on the wire
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
    /// UTF-8 text
    Text(String),
    /// Structured data
    Json(serde_json::Value),
}

impl Payload {
    /// Short name of the payload kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Bytes(_) => "bytes",
            Payload::Text(_) => "text",
            Payload::Json(_) => "json",
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Short human-readable preview, used as a stamp seed
    pub(crate) fn preview(&self, max_chars: usize) -> String {
        let full = match self {
            Payload::Bytes(bytes) => format!("{:?}", &bytes[..bytes.len().min(max_chars)]),
            Payload::Text(text) => text.clone(),
            Payload::Json(value) => value.to_string(),
        };
        full.chars().take(max_chars).collect()
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

macro_rules! json_payload_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Payload {
                fn from(value: $ty) -> Self {
                    Payload::Json(serde_json::Value::from(value))
                }
            }
        )*
    };
}

json_payload_from!(bool, i32, i64, u32, u64, f64);

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Payload::Bytes(value)
    }
}

impl From<&[u8]> for Payload {
    fn from(value: &[u8]) -> Self {
        Payload::Bytes(value.to_vec())
    }
}

/// How a live value is held: inline, or as a reference to an object record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "storage", content = "data", rename_all = "snake_case")]
pub enum StoredValue {
    Inline(Payload),
    ObjectRef(Stamp),
}

impl StoredValue {
    pub fn is_object_ref(&self) -> bool {
        matches!(self, StoredValue::ObjectRef(_))
    }

    /// Stamp of the referenced object, if this is a reference
    pub fn object_ref(&self) -> Option<&Stamp> {
        match self {
            StoredValue::ObjectRef(stamp) => Some(stamp),
            StoredValue::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&Payload> {
        match self {
            StoredValue::Inline(payload) => Some(payload),
            StoredValue::ObjectRef(_) => None,
        }
    }
}

/// One state of a variable: a live value or the deletion tombstone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "stored", rename_all = "snake_case")]
pub enum VarValue {
    Live(StoredValue),
    Deleted,
}

impl VarValue {
    pub fn is_deleted(&self) -> bool {
        matches!(self, VarValue::Deleted)
    }

    pub fn as_live(&self) -> Option<&StoredValue> {
        match self {
            VarValue::Live(stored) => Some(stored),
            VarValue::Deleted => None,
        }
    }
}

/// A single entry of a variable's value history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarEntry {
    pub stamp: Stamp,
    pub value: VarValue,
}

/// A single entry of a variable's description history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionEntry {
    pub stamp: Stamp,
    pub description: String,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
