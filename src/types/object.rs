//! Object record types for compressed payload storage

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Stamp;

/// How an object payload was serialized before compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Raw bytes, stored as-is
    Bytes,
    /// UTF-8 text
    Text,
    /// Structured data as JSON
    Json,
    /// Opaque binary fallback (MessagePack)
    #[serde(rename = "msgpack")]
    MessagePack,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Bytes => "bytes",
            ContentType::Text => "text",
            ContentType::Json => "json",
            ContentType::MessagePack => "msgpack",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compressed payload, portable enough to embed in a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Base64 of the zlib-compressed serialized payload
    pub data: String,
    pub size_original: usize,
    pub size_compressed: usize,
    pub content_type: ContentType,
}

impl ObjectRecord {
    /// Compressed size divided by original size (0 for empty payloads)
    pub fn compression_ratio(&self) -> f64 {
        if self.size_original == 0 {
            0.0
        } else {
            self.size_compressed as f64 / self.size_original as f64
        }
    }
}

/// Metadata about a stored object, available without decompressing it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInfo {
    pub stamp: Stamp,
    pub size_original: usize,
    pub size_compressed: usize,
    pub content_type: ContentType,
    pub compression_ratio: f64,
}

impl ObjectInfo {
    pub fn from_record(stamp: Stamp, record: &ObjectRecord) -> Self {
        Self {
            stamp,
            size_original: record.size_original,
            size_compressed: record.size_compressed,
            content_type: record.content_type,
            compression_ratio: record.compression_ratio(),
        }
    }
}
