//! Stamp-keyed map of compressed object records

use std::collections::BTreeMap;

use crate::error::MemoryResult;
use crate::types::{ObjectInfo, ObjectRecord, Payload, Stamp};

use super::codec;

/// Map from object stamp to compressed record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectStore {
    records: BTreeMap<Stamp, ObjectRecord>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from previously exported records, verbatim
    pub fn from_records(records: BTreeMap<Stamp, ObjectRecord>) -> Self {
        Self { records }
    }

    pub fn insert(&mut self, stamp: Stamp, record: ObjectRecord) {
        self.records.insert(stamp, record);
    }

    pub fn contains(&self, stamp: &str) -> bool {
        self.records.contains_key(stamp)
    }

    pub fn record(&self, stamp: &str) -> Option<&ObjectRecord> {
        self.records.get(stamp)
    }

    /// Decompress an object; `Ok(None)` if no such stamp exists
    pub fn retrieve(&self, stamp: &str) -> MemoryResult<Option<Payload>> {
        self.records.get(stamp).map(codec::decompress).transpose()
    }

    /// Metadata of an object without decompressing it
    pub fn info(&self, stamp: &str) -> Option<ObjectInfo> {
        self.records
            .get_key_value(stamp)
            .map(|(stamp, record)| ObjectInfo::from_record(stamp.clone(), record))
    }

    pub fn records(&self) -> &BTreeMap<Stamp, ObjectRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of original payload sizes
    pub fn total_original_size(&self) -> usize {
        self.records.values().map(|r| r.size_original).sum()
    }

    /// Sum of compressed payload sizes
    pub fn total_compressed_size(&self) -> usize {
        self.records.values().map(|r| r.size_compressed).sum()
    }
}
