//! Snapshot documents and their on-disk form
//!
//! A [`Snapshot`] is the minimal self-sufficient export of a memory: its id,
//! every event and every object record. Indices and variable histories are
//! left out because replaying the events rebuilds them.
//!
//! A [`PortableDocument`] is the full JSON export. It also carries the
//! variable histories and the five indices for readers that want them, but
//! importing it still goes through replay; the extra fields are only checked
//! against the rebuilt state.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, MemoryResult};
use crate::types::{DescriptionEntry, Event, ObjectRecord, Stamp, VarEntry};
use crate::utils::atomic_write_with;

use super::index::SortedIndex;

/// Current version of the persisted document format
pub const FORMAT_VERSION: &str = "1";

/// Events and objects sufficient to rebuild a memory by replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub id: Stamp,
    /// Events in chronological order
    pub events: Vec<Event>,
    pub objects: BTreeMap<Stamp, ObjectRecord>,
}

/// Full JSON export of a memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortableDocument {
    pub version: String,
    pub id: Stamp,
    pub events: Vec<Event>,
    pub objects: BTreeMap<Stamp, ObjectRecord>,
    /// Value history per variable; deletions appear as tagged tombstones
    pub vars: BTreeMap<String, Vec<VarEntry>>,
    pub var_descriptions: BTreeMap<String, Vec<DescriptionEntry>>,
    pub idx_messages: SortedIndex,
    pub idx_reflections: SortedIndex,
    pub idx_logs: SortedIndex,
    pub idx_variables: SortedIndex,
    pub idx_all: SortedIndex,
}

/// Reject documents written by an unknown format version
pub fn check_version(version: &str) -> MemoryResult<()> {
    if version == FORMAT_VERSION {
        Ok(())
    } else {
        Err(MemoryError::UnsupportedVersion(version.to_string()))
    }
}

/// Atomically write a document as JSON, optionally gzip-compressed
pub fn write_document<T, P>(path: P, document: &T, compressed: bool) -> MemoryResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let bytes = serde_json::to_vec(document)?;

    atomic_write_with(path, |writer| {
        if compressed {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            encoder.write_all(&bytes)?;
            encoder.finish()?;
            Ok(())
        } else {
            writer.write_all(&bytes)
        }
    })?;

    Ok(())
}

/// Read a document written by [`write_document`]
///
/// Any IO, decompression or parse failure is returned as an error; nothing
/// partial is ever produced.
pub fn read_document<T, P>(path: P, compressed: bool) -> MemoryResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let reader = BufReader::new(File::open(path)?);
    let mut bytes = Vec::new();

    if compressed {
        GzDecoder::new(reader).read_to_end(&mut bytes)?;
    } else {
        let mut reader = reader;
        reader.read_to_end(&mut bytes)?;
    }

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            version: FORMAT_VERSION.to_string(),
            id: Stamp::from("MEMORYID00000000"),
            events: Vec::new(),
            objects: BTreeMap::new(),
        }
    }

    #[test]
    fn test_write_and_read_plain() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("memory.json");

        write_document(&path, &empty_snapshot(), false).unwrap();
        let loaded: Snapshot = read_document(&path, false).unwrap();

        assert_eq!(loaded, empty_snapshot());
    }

    #[test]
    fn test_write_and_read_compressed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("memory.json.gz");

        write_document(&path, &empty_snapshot(), true).unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        let loaded: Snapshot = read_document(&path, true).unwrap();
        assert_eq!(loaded, empty_snapshot());
    }

    #[test]
    fn test_reading_compressed_as_plain_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("memory.json.gz");
        write_document(&path, &empty_snapshot(), true).unwrap();

        let result: MemoryResult<Snapshot> = read_document(&path, false);
        assert!(matches!(result, Err(MemoryError::Json(_))));
    }

    #[test]
    fn test_check_version() {
        assert!(check_version(FORMAT_VERSION).is_ok());
        assert!(matches!(
            check_version("0.9"),
            Err(MemoryError::UnsupportedVersion(_))
        ));
    }
}
