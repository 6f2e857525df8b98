//! Payload compression codec
//!
//! A payload is serialized according to its content type, compressed with
//! zlib at the highest level, and base64 encoded so the resulting
//! [`ObjectRecord`] can be embedded in a JSON document.

use std::io::{self, Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{MemoryError, MemoryResult};
use crate::types::{ContentType, ObjectRecord, Payload};

fn mismatch(content_type: ContentType, payload: &Payload) -> MemoryError {
    MemoryError::ContentMismatch {
        content_type: content_type.to_string(),
        payload: payload.kind().to_string(),
    }
}

/// Pick a content type for a payload
///
/// Bytes and text map to themselves. Structured data is stored as JSON; the
/// MessagePack fallback is used only if JSON serialization fails.
pub fn detect_content_type(payload: &Payload) -> ContentType {
    match payload {
        Payload::Bytes(_) => ContentType::Bytes,
        Payload::Text(_) => ContentType::Text,
        Payload::Json(_) => ContentType::Json,
    }
}

/// Serialize a payload to raw bytes under a content type
///
/// Only pairings that [`deserialize`] maps back to the same payload variant
/// are accepted.
fn serialize(payload: &Payload, content_type: ContentType) -> MemoryResult<Vec<u8>> {
    match (content_type, payload) {
        (ContentType::Bytes, Payload::Bytes(bytes)) => Ok(bytes.clone()),
        (ContentType::Text, Payload::Text(text)) => Ok(text.as_bytes().to_vec()),
        (ContentType::Json, Payload::Json(value)) => Ok(serde_json::to_vec(value)?),
        (ContentType::MessagePack, Payload::Json(value)) => Ok(rmp_serde::to_vec_named(value)?),
        (content_type, payload) => Err(mismatch(content_type, payload)),
    }
}

/// Inverse of [`serialize`]
fn deserialize(raw: Vec<u8>, content_type: ContentType) -> MemoryResult<Payload> {
    match content_type {
        ContentType::Bytes => Ok(Payload::Bytes(raw)),
        ContentType::Text => String::from_utf8(raw)
            .map(Payload::Text)
            .map_err(|e| MemoryError::CorruptObject(format!("text object is not UTF-8: {}", e))),
        ContentType::Json => Ok(Payload::Json(serde_json::from_slice(&raw)?)),
        ContentType::MessagePack => Ok(Payload::Json(rmp_serde::from_slice(&raw)?)),
    }
}

fn zlib_compress(raw: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(raw)?;
    encoder.finish()
}

fn zlib_decompress(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;
    Ok(raw)
}

/// Compress a payload into a portable record
///
/// With `content_type` of `None` the type is detected from the payload.
pub fn compress(payload: &Payload, content_type: Option<ContentType>) -> MemoryResult<ObjectRecord> {
    let (content_type, raw) = match content_type {
        Some(explicit) => (explicit, serialize(payload, explicit)?),
        None => {
            let detected = detect_content_type(payload);
            match serialize(payload, detected) {
                Ok(raw) => (detected, raw),
                Err(MemoryError::Json(_)) => (
                    ContentType::MessagePack,
                    serialize(payload, ContentType::MessagePack)?,
                ),
                Err(e) => return Err(e),
            }
        }
    };

    let compressed = zlib_compress(&raw).map_err(|e| MemoryError::Compression(e.to_string()))?;

    Ok(ObjectRecord {
        data: STANDARD.encode(&compressed),
        size_original: raw.len(),
        size_compressed: compressed.len(),
        content_type,
    })
}

/// Decompress a record back into the payload it was built from
pub fn decompress(record: &ObjectRecord) -> MemoryResult<Payload> {
    let compressed = STANDARD.decode(record.data.as_bytes())?;
    let raw = zlib_decompress(&compressed).map_err(|e| MemoryError::Compression(e.to_string()))?;

    if raw.len() != record.size_original {
        return Err(MemoryError::CorruptObject(format!(
            "expected {} bytes after decompression, found {}",
            record.size_original,
            raw.len()
        )));
    }

    deserialize(raw, record.content_type)
}

/// `io::Write` sink that only counts bytes
#[derive(Default)]
struct ByteCounter(usize);

impl Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Estimated serialized size of a payload in bytes
///
/// Bytes and text report their length directly. Structured data is streamed
/// through the JSON serializer into a counter, so nothing is buffered or
/// compressed. The estimate equals `size_original` of the record
/// [`compress`] would build with an auto-detected content type.
pub fn estimate_size(payload: &Payload) -> usize {
    match payload {
        Payload::Bytes(bytes) => bytes.len(),
        Payload::Text(text) => text.len(),
        Payload::Json(value) => {
            let mut counter = ByteCounter::default();
            match serde_json::to_writer(&mut counter, value) {
                Ok(()) => counter.0,
                Err(_) => rmp_serde::to_vec_named(value).map(|v| v.len()).unwrap_or(0),
            }
        }
    }
}
