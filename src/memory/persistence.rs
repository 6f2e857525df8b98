//! Snapshots, replay and file persistence
//!
//! Every way of restoring a memory ends in [`rehydrate_with_id`]: events are
//! sorted by timestamp and re-applied through the live write path, so indices
//! and variable histories are always rebuilt rather than trusted.

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;

use crate::error::{MemoryError, MemoryResult};
use crate::event_store::{
    check_version, read_document, write_document, PortableDocument, Snapshot, FORMAT_VERSION,
};
use crate::object_store::{decompress, ObjectStore};
use crate::types::{Event, ObjectRecord, Stamp, VarValue};
use crate::utils::atomic_write;
use crate::utils::stamp;

use super::{Memory, MemoryConfig};

pub fn snapshot(memory: &Memory) -> Snapshot {
    Snapshot {
        version: FORMAT_VERSION.to_string(),
        id: memory.id.clone(),
        events: memory.events.iter_chronological().cloned().collect(),
        objects: memory.objects.records().clone(),
    }
}

/// Rebuild a memory by replaying events in timestamp order
///
/// The input order does not matter. Every object record must decode, and two
/// events sharing a stamp make the whole replay fail.
pub fn rehydrate_with_id(
    id: Stamp,
    mut events: Vec<Event>,
    objects: Option<BTreeMap<Stamp, ObjectRecord>>,
) -> MemoryResult<Memory> {
    events.sort_by(|a, b| (a.created_at, &a.stamp).cmp(&(b.created_at, &b.stamp)));

    let mut memory = Memory::with_id(id, MemoryConfig::default());
    if let Some(records) = objects {
        verify_objects(&records)?;
        memory.objects = ObjectStore::from_records(records);
    }

    let count = events.len();
    for event in events {
        memory.apply_event(event)?;
    }

    warn_dangling_references(&memory);
    tracing::info!(
        id = %memory.id,
        events = count,
        objects = memory.objects.len(),
        "rehydrated memory"
    );
    Ok(memory)
}

pub fn rehydrate(
    events: Vec<Event>,
    objects: Option<BTreeMap<Stamp, ObjectRecord>>,
) -> MemoryResult<Memory> {
    rehydrate_with_id(stamp::generate(None), events, objects)
}

pub fn from_snapshot(snapshot: Snapshot) -> MemoryResult<Memory> {
    check_version(&snapshot.version)?;
    rehydrate_with_id(snapshot.id, snapshot.events, Some(snapshot.objects))
}

/// Decode every record, failing on the first one that does not round-trip
fn verify_objects(records: &BTreeMap<Stamp, ObjectRecord>) -> MemoryResult<()> {
    records.par_iter().try_for_each(|(stamp, record)| {
        decompress(record).map(|_| ()).map_err(|e| {
            MemoryError::SnapshotCorrupted(format!("object {} does not decode: {}", stamp, e))
        })
    })
}

fn warn_dangling_references(memory: &Memory) {
    for (key, history) in &memory.vars {
        for entry in history {
            if let VarValue::Live(stored) = &entry.value {
                if let Some(object) = stored.object_ref() {
                    if !memory.objects.contains(object.as_str()) {
                        tracing::warn!(
                            key = %key,
                            stamp = %entry.stamp,
                            object = %object,
                            "variable references a missing object"
                        );
                    }
                }
            }
        }
    }
}

pub fn to_portable(memory: &Memory) -> PortableDocument {
    let indices = memory.events.indices();
    PortableDocument {
        version: FORMAT_VERSION.to_string(),
        id: memory.id.clone(),
        events: memory.events.iter_chronological().cloned().collect(),
        objects: memory.objects.records().clone(),
        vars: memory.vars.clone(),
        var_descriptions: memory.var_descriptions.clone(),
        idx_messages: indices.messages.clone(),
        idx_reflections: indices.reflections.clone(),
        idx_logs: indices.logs.clone(),
        idx_variables: indices.variables.clone(),
        idx_all: indices.all.clone(),
    }
}

/// Rebuild a memory from a portable document
///
/// The document's variable histories and indices must agree with what replay
/// produces; any disagreement means the document was tampered with or
/// truncated, and nothing is returned.
pub fn from_portable(document: PortableDocument) -> MemoryResult<Memory> {
    check_version(&document.version)?;

    let PortableDocument {
        id,
        events,
        objects,
        vars,
        var_descriptions,
        idx_messages,
        idx_reflections,
        idx_logs,
        idx_variables,
        idx_all,
        ..
    } = document;

    let memory = rehydrate_with_id(id, events, Some(objects))?;
    let indices = memory.events.indices();

    let mismatch = [
        ("vars", memory.vars == vars),
        ("var_descriptions", memory.var_descriptions == var_descriptions),
        ("idx_messages", indices.messages == idx_messages),
        ("idx_reflections", indices.reflections == idx_reflections),
        ("idx_logs", indices.logs == idx_logs),
        ("idx_variables", indices.variables == idx_variables),
        ("idx_all", indices.all == idx_all),
    ]
    .into_iter()
    .find(|(_, matches)| !matches);

    if let Some((field, _)) = mismatch {
        return Err(MemoryError::SnapshotCorrupted(format!(
            "{} does not match the replayed events",
            field
        )));
    }

    Ok(memory)
}

pub fn export_json(memory: &Memory) -> MemoryResult<String> {
    let json = serde_json::to_string_pretty(&to_portable(memory))?;
    tracing::info!(id = %memory.id, bytes = json.len(), "exported memory");
    Ok(json)
}

pub fn export_json_to<P: AsRef<Path>>(memory: &Memory, path: P) -> MemoryResult<()> {
    let json = export_json(memory)?;
    atomic_write(path, json.as_bytes())?;
    Ok(())
}

pub fn import_json(json: &str) -> MemoryResult<Memory> {
    let document: PortableDocument = serde_json::from_str(json)?;
    let memory = from_portable(document)?;
    tracing::info!(id = %memory.id, events = memory.len(), "imported memory");
    Ok(memory)
}

pub fn import_json_file<P: AsRef<Path>>(path: P) -> MemoryResult<Memory> {
    let json = std::fs::read_to_string(path)?;
    import_json(&json)
}

/// Atomically write the portable document, optionally gzip-compressed
pub fn save<P: AsRef<Path>>(memory: &Memory, path: P, compressed: bool) -> MemoryResult<()> {
    let path = path.as_ref();
    write_document(path, &to_portable(memory), compressed)?;
    tracing::info!(
        id = %memory.id,
        path = %path.display(),
        compressed,
        events = memory.len(),
        "saved memory"
    );
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P, compressed: bool) -> MemoryResult<Memory> {
    let path = path.as_ref();
    let document: PortableDocument = read_document(path, compressed)?;
    let memory = from_portable(document)?;
    tracing::info!(
        id = %memory.id,
        path = %path.display(),
        events = memory.len(),
        "loaded memory"
    );
    Ok(memory)
}
