//! Variable history: set, delete and read variables
//!
//! Each key keeps an append-only list of entries. Setting appends a live
//! value, deleting appends a tombstone, and the current value is whatever the
//! last entry holds. Values larger than the configured threshold are moved to
//! the object store and referenced by stamp.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::error::{MemoryError, MemoryResult};
use crate::object_store::{compress, estimate_size};
use crate::types::{DescriptionEntry, EventData, Payload, Stamp, StoredValue, VarEntry, VarValue};

use super::{Memory, OBJECT_SEED_CHARS};

/// Returned when a variable has no description
pub const NO_DESCRIPTION: &str = "No description found.";

/// Set a variable, externalizing large values to the object store
///
/// Compression is the only fallible step and runs before anything is
/// recorded, so a failure leaves neither an object nor an event behind.
pub fn set_variable(
    memory: &mut Memory,
    key: &str,
    value: Payload,
    description: Option<&str>,
) -> MemoryResult<Stamp> {
    let size = estimate_size(&value);

    let stored = if size > memory.config.object_threshold {
        let record = compress(&value, None)?;
        let (_, object_stamp) = memory.next_stamp(Some(&value.preview(OBJECT_SEED_CHARS)));
        tracing::debug!(
            key,
            size,
            object = %object_stamp,
            ratio = record.compression_ratio(),
            "externalizing variable to object store"
        );
        memory.objects.insert(object_stamp.clone(), record);
        StoredValue::ObjectRef(object_stamp)
    } else {
        StoredValue::Inline(value)
    };

    record_variable(memory, key, stored, description)
}

/// Append a variable event holding an already stored value
pub(crate) fn record_variable(
    memory: &mut Memory,
    key: &str,
    stored: StoredValue,
    description: Option<&str>,
) -> MemoryResult<Stamp> {
    memory.record(
        EventData::Variable {
            key: key.to_string(),
            value: VarValue::Live(stored),
            description: description.filter(|d| !d.is_empty()).map(str::to_string),
        },
        key,
    )
}

/// Tombstone a variable; fails if the key was never set
pub fn delete_variable(memory: &mut Memory, key: &str) -> MemoryResult<Stamp> {
    if !memory.vars.contains_key(key) {
        return Err(MemoryError::VariableNotFound(key.to_string()));
    }

    memory.record(
        EventData::Variable {
            key: key.to_string(),
            value: VarValue::Deleted,
            description: None,
        },
        key,
    )
}

/// Dereference a stored value; a dangling reference resolves to `None`
pub(crate) fn resolve(memory: &Memory, stored: &StoredValue) -> MemoryResult<Option<Payload>> {
    match stored {
        StoredValue::Inline(payload) => Ok(Some(payload.clone())),
        StoredValue::ObjectRef(stamp) => memory.objects.retrieve(stamp.as_str()),
    }
}

/// Current stored value, without dereferencing
pub fn get_variable_raw<'a>(memory: &'a Memory, key: &str) -> Option<&'a StoredValue> {
    memory
        .vars
        .get(key)
        .and_then(|history| history.last())
        .and_then(|entry| entry.value.as_live())
}

pub fn get_variable(memory: &Memory, key: &str) -> MemoryResult<Option<Payload>> {
    match get_variable_raw(memory, key) {
        Some(stored) => resolve(memory, stored),
        None => Ok(None),
    }
}

/// Current stored values of all live variables
pub fn get_all_variables_raw(memory: &Memory) -> BTreeMap<String, StoredValue> {
    memory
        .vars
        .iter()
        .filter_map(|(key, history)| {
            let stored = history.last()?.value.as_live()?;
            Some((key.clone(), stored.clone()))
        })
        .collect()
}

/// Dereferenced values of all live variables
///
/// Object references are decompressed in parallel. Variables whose
/// reference dangles are left out.
pub fn get_all_variables(memory: &Memory) -> MemoryResult<BTreeMap<String, Payload>> {
    let live: Vec<(&String, &StoredValue)> = memory
        .vars
        .iter()
        .filter_map(|(key, history)| Some((key, history.last()?.value.as_live()?)))
        .collect();

    let resolved: Vec<Option<(String, Payload)>> = live
        .into_par_iter()
        .map(|(key, stored)| {
            resolve(memory, stored).map(|payload| payload.map(|payload| (key.clone(), payload)))
        })
        .collect::<MemoryResult<_>>()?;

    Ok(resolved.into_iter().flatten().collect())
}

/// Full value history of a variable, oldest first
///
/// With `resolve_references`, object references are replaced by their inline
/// payloads; dangling references are kept as they are.
pub fn get_variable_history(
    memory: &Memory,
    key: &str,
    resolve_references: bool,
) -> MemoryResult<Vec<VarEntry>> {
    let Some(history) = memory.vars.get(key) else {
        return Ok(Vec::new());
    };
    if !resolve_references {
        return Ok(history.clone());
    }

    history
        .iter()
        .map(|entry| {
            let value = match &entry.value {
                VarValue::Live(stored @ StoredValue::ObjectRef(_)) => match resolve(memory, stored)? {
                    Some(payload) => VarValue::Live(StoredValue::Inline(payload)),
                    None => entry.value.clone(),
                },
                other => other.clone(),
            };
            Ok(VarEntry {
                stamp: entry.stamp.clone(),
                value,
            })
        })
        .collect()
}

/// Whether the last entry of a variable is a tombstone
pub fn is_variable_deleted(memory: &Memory, key: &str) -> bool {
    memory
        .vars
        .get(key)
        .and_then(|history| history.last())
        .is_some_and(|entry| entry.value.is_deleted())
}

pub fn get_variable_description<'a>(memory: &'a Memory, key: &str) -> &'a str {
    memory
        .var_descriptions
        .get(key)
        .and_then(|history| history.last())
        .map_or(NO_DESCRIPTION, |entry| entry.description.as_str())
}

pub fn get_variable_description_history<'a>(
    memory: &'a Memory,
    key: &str,
) -> &'a [DescriptionEntry] {
    memory
        .var_descriptions
        .get(key)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryConfig;
    use serde_json::json;

    #[test]
    fn test_set_and_overwrite() {
        let mut memory = Memory::new();
        let s1 = memory.set_variable("x", 1, Some("first")).unwrap();
        let s2 = memory.set_variable("x", 2, None).unwrap();

        assert_eq!(memory.get_variable("x").unwrap(), Some(Payload::from(2)));
        assert_eq!(memory.get_variable_description("x"), "first");

        let history = memory.get_variable_history("x", false).unwrap();
        assert_eq!(
            history,
            vec![
                VarEntry {
                    stamp: s1,
                    value: VarValue::Live(StoredValue::Inline(Payload::from(1))),
                },
                VarEntry {
                    stamp: s2,
                    value: VarValue::Live(StoredValue::Inline(Payload::from(2))),
                },
            ]
        );
        let first = memory.event(history[0].stamp.as_str()).unwrap();
        let second = memory.event(history[1].stamp.as_str()).unwrap();
        assert!(first.created_at < second.created_at);
    }

    #[test]
    fn test_delete_and_reset() {
        let mut memory = Memory::new();
        memory.set_variable("k", "v1", None).unwrap();
        memory.delete_variable("k").unwrap();

        assert_eq!(memory.get_variable("k").unwrap(), None);
        assert!(memory.is_variable_deleted("k"));
        assert!(memory.get_all_variables().unwrap().is_empty());

        memory.set_variable("k", "v2", None).unwrap();
        assert_eq!(memory.get_variable("k").unwrap(), Some(Payload::from("v2")));
        assert!(!memory.is_variable_deleted("k"));

        let history = memory.get_variable_history("k", false).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[1].value.is_deleted());
    }

    #[test]
    fn test_delete_unknown_key_fails() {
        let mut memory = Memory::new();
        let err = memory.delete_variable("ghost").unwrap_err();

        assert!(matches!(err, MemoryError::VariableNotFound(ref k) if k == "ghost"));
        assert!(memory.is_empty());
        assert!(!memory.is_variable_deleted("ghost"));
    }

    #[test]
    fn test_large_value_becomes_object_ref() {
        let mut memory = Memory::with_config(MemoryConfig::new().with_object_threshold(10_000));
        let big = "z".repeat(20_000);
        memory.set_variable("doc", big.as_str(), None).unwrap();

        let raw = memory.get_variable_raw("doc").unwrap();
        let object = raw.object_ref().unwrap().clone();
        assert!(memory.get_object_info(object.as_str()).is_some());

        assert_eq!(memory.get_variable("doc").unwrap(), Some(Payload::Text(big.clone())));

        let raw_history = memory.get_variable_history("doc", false).unwrap();
        assert!(raw_history[0].value.as_live().unwrap().is_object_ref());

        let resolved_history = memory.get_variable_history("doc", true).unwrap();
        assert_eq!(
            resolved_history[0].value,
            VarValue::Live(StoredValue::Inline(Payload::Text(big)))
        );
    }

    #[test]
    fn test_large_bytes_round_trip_bitwise() {
        let mut memory = Memory::with_config(MemoryConfig::new().with_object_threshold(100));
        let bytes: Vec<u8> = (0..4096u32).map(|i| (i * 7 % 256) as u8).collect();
        memory.set_variable("blob", bytes.clone(), None).unwrap();

        assert!(memory.get_variable_raw("blob").unwrap().is_object_ref());
        assert_eq!(memory.get_variable("blob").unwrap(), Some(Payload::Bytes(bytes)));
    }

    #[test]
    fn test_small_value_stays_inline() {
        let mut memory = Memory::new();
        memory
            .set_variable("cfg", json!({"model": "small", "temperature": 0.2}), None)
            .unwrap();

        assert!(!memory.get_variable_raw("cfg").unwrap().is_object_ref());
        assert!(memory.object_store().is_empty());
    }

    #[test]
    fn test_get_all_variables_resolves_refs() {
        let mut memory = Memory::with_config(MemoryConfig::new().with_object_threshold(32));
        memory.set_variable("small", 1, None).unwrap();
        memory.set_variable("large", "x".repeat(500), None).unwrap();
        memory.set_variable("gone", true, None).unwrap();
        memory.delete_variable("gone").unwrap();

        let all = memory.get_all_variables().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["large"], Payload::Text("x".repeat(500)));

        let raw = memory.get_all_variables_raw();
        assert!(raw["large"].is_object_ref());
        assert!(!raw.contains_key("gone"));
    }

    #[test]
    fn test_description_history() {
        let mut memory = Memory::new();
        assert_eq!(memory.get_variable_description("x"), NO_DESCRIPTION);

        memory.set_variable("x", 1, Some("first")).unwrap();
        memory.set_variable("x", 2, Some("")).unwrap();
        memory.set_variable("x", 3, Some("third")).unwrap();

        let descriptions: Vec<&str> = memory
            .get_variable_description_history("x")
            .iter()
            .map(|entry| entry.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["first", "third"]);
        assert_eq!(memory.get_variable_description("x"), "third");
    }

    #[test]
    fn test_marker_lookalike_is_a_value() {
        let mut memory = Memory::new();
        memory.set_variable("x", "__VAR_DELETED__", None).unwrap();

        assert!(!memory.is_variable_deleted("x"));
        assert_eq!(
            memory.get_variable("x").unwrap(),
            Some(Payload::from("__VAR_DELETED__"))
        );
    }
}
