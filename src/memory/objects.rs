//! Direct object storage

use crate::error::MemoryResult;
use crate::object_store::compress;
use crate::types::{ContentType, ObjectInfo, Payload, Stamp, StoredValue};

use super::variables::record_variable;
use super::{Memory, OBJECT_SEED_CHARS};

/// Compress a payload into the object store and return its stamp
///
/// With a `name`, a variable event referencing the object is also recorded,
/// whatever the payload size. Objects are never evicted.
pub fn store_object(
    memory: &mut Memory,
    data: Payload,
    name: Option<&str>,
    description: Option<&str>,
    content_type: Option<ContentType>,
) -> MemoryResult<Stamp> {
    let record = compress(&data, content_type)?;
    let (_, stamp) = memory.next_stamp(Some(&data.preview(OBJECT_SEED_CHARS)));

    tracing::debug!(
        object = %stamp,
        content_type = %record.content_type,
        size_original = record.size_original,
        size_compressed = record.size_compressed,
        "storing object"
    );
    memory.objects.insert(stamp.clone(), record);

    if let Some(name) = name {
        record_variable(
            memory,
            name,
            StoredValue::ObjectRef(stamp.clone()),
            description,
        )?;
    }

    Ok(stamp)
}

/// Decompressed object, or `None` for an unknown stamp
pub fn get_object(memory: &Memory, stamp: &str) -> MemoryResult<Option<Payload>> {
    memory.objects.retrieve(stamp)
}

pub fn get_object_info(memory: &Memory, stamp: &str) -> Option<ObjectInfo> {
    memory.objects.info(stamp)
}
