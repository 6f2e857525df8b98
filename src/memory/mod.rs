//! Memory - the event-sourced aggregate root
//!
//! A [`Memory`] records every change (messages, logs, reflections and
//! variable writes) as an immutable event. Live mutations and replay share
//! one write path, [`Memory::apply_event`], so a rehydrated memory is built
//! exactly the way the original was.
//!
//! The type does no locking of its own. Wrap it in [`SharedMemory`] (or any
//! other mutex) to share it across threads.

mod config;
mod context;
mod messages;
mod objects;
mod persistence;
mod shared;
mod stats;
mod variables;

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{MemoryError, MemoryResult};
use crate::event_store::{EventStore, PortableDocument, Snapshot};
use crate::object_store::ObjectStore;
use crate::types::{
    Category, Channel, ContentType, DescriptionEntry, Event, EventData, Mode, ObjectInfo,
    ObjectRecord, Payload, Role, Stamp, StoredValue, VarEntry,
};
use crate::utils::stamp;
use crate::utils::MonotonicClock;

pub use config::{ContextOptions, MemoryConfig, OBJECT_THRESHOLD_ENV};
pub use context::ContextMessage;
pub use messages::MessageFilter;
pub use shared::SharedMemory;
pub use stats::MemoryStats;
pub use variables::NO_DESCRIPTION;

/// Characters of content used to seed an event stamp
const SEED_CHARS: usize = 64;

/// Characters of a payload preview used to seed an object stamp
pub(crate) const OBJECT_SEED_CHARS: usize = 50;

/// Event-sourced state store for one agent or session
#[derive(Debug, Clone)]
pub struct Memory {
    pub(crate) id: Stamp,
    pub(crate) config: MemoryConfig,
    pub(crate) clock: MonotonicClock,
    pub(crate) events: EventStore,
    pub(crate) vars: BTreeMap<String, Vec<VarEntry>>,
    pub(crate) var_descriptions: BTreeMap<String, Vec<DescriptionEntry>>,
    pub(crate) objects: ObjectStore,
}

impl Memory {
    /// Create an empty memory with the default configuration
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    /// Create an empty memory with a custom configuration
    pub fn with_config(config: MemoryConfig) -> Self {
        Self::with_id(stamp::generate(None), config)
    }

    pub(crate) fn with_id(id: Stamp, config: MemoryConfig) -> Self {
        Self {
            id,
            config,
            clock: MonotonicClock::new(),
            events: EventStore::new(),
            vars: BTreeMap::new(),
            var_descriptions: BTreeMap::new(),
            objects: ObjectStore::new(),
        }
    }

    pub fn id(&self) -> &Stamp {
        &self.id
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MemoryConfig) {
        self.config = config;
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Look up a single event by stamp
    pub fn event(&self, stamp: &str) -> Option<&Event> {
        self.events.get(stamp)
    }

    /// The underlying event map and indices
    pub fn event_store(&self) -> &EventStore {
        &self.events
    }

    pub fn object_store(&self) -> &ObjectStore {
        &self.objects
    }

    /// Timestamp and stamp for a new event or object
    ///
    /// Stamps are unique with high probability only, so a stamp already used
    /// by an event or object is discarded and a new one drawn.
    pub(crate) fn next_stamp(&mut self, seed: Option<&str>) -> (DateTime<Utc>, Stamp) {
        loop {
            let created_at = self.clock.now();
            let stamp = stamp::generate_at(created_at, seed);
            if !self.events.contains(stamp.as_str()) && !self.objects.contains(stamp.as_str()) {
                return (created_at, stamp);
            }
            tracing::debug!(stamp = %stamp, "stamp collision, drawing another");
        }
    }

    /// Build a new event from `data` and apply it
    pub(crate) fn record(&mut self, data: EventData, seed: &str) -> MemoryResult<Stamp> {
        let seed: String = seed.chars().take(SEED_CHARS).collect();
        let (created_at, stamp) = self.next_stamp(Some(&seed));
        let event = Event::new(stamp.clone(), created_at, data);

        tracing::debug!(
            stamp = %stamp,
            category = %event.category(),
            "appending event"
        );
        self.apply_event(event)?;
        Ok(stamp)
    }

    /// Apply one event to the event store, indices and variable histories
    ///
    /// This is the only write path, used both by live mutations and replay.
    /// A duplicate stamp, or a tombstone for a key with no history, is
    /// rejected before any state changes.
    pub(crate) fn apply_event(&mut self, event: Event) -> MemoryResult<()> {
        let variable = match &event.data {
            EventData::Variable {
                key,
                value,
                description,
            } => {
                if value.is_deleted() && !self.vars.contains_key(key) {
                    return Err(MemoryError::VariableNotFound(key.clone()));
                }
                Some((key.clone(), value.clone(), description.clone()))
            }
            _ => None,
        };
        let stamp = event.stamp.clone();
        let created_at = event.created_at;

        self.events.append(event)?;
        self.clock.observe(created_at);

        if let Some((key, value, description)) = variable {
            if let Some(description) = description.filter(|d| !d.is_empty()) {
                self.var_descriptions
                    .entry(key.clone())
                    .or_default()
                    .push(DescriptionEntry {
                        stamp: stamp.clone(),
                        description,
                    });
            }
            self.vars
                .entry(key)
                .or_default()
                .push(VarEntry { stamp, value });
        }

        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

// Public operations, implemented in the submodules
impl Memory {
    // Messages, logs and reflections (from messages.rs)
    pub fn append_message(
        &mut self,
        role: Role,
        content: impl Into<String>,
        mode: Mode,
        channel: Channel,
    ) -> MemoryResult<Stamp> {
        messages::append_message(self, role, content.into(), mode, channel)
    }

    pub fn append_message_str(
        &mut self,
        role: &str,
        content: impl Into<String>,
        mode: &str,
        channel: &str,
    ) -> MemoryResult<Stamp> {
        messages::append_message_str(self, role, content.into(), mode, channel)
    }

    pub fn append_log(&mut self, content: impl Into<String>) -> MemoryResult<Stamp> {
        messages::append_log(self, content.into())
    }

    pub fn append_reflection(&mut self, content: impl Into<String>) -> MemoryResult<Stamp> {
        messages::append_reflection(self, content.into())
    }

    pub fn get_messages(&self, filter: &MessageFilter) -> Vec<&Event> {
        messages::get_messages(self, filter)
    }

    pub fn get_events(
        &self,
        limit: Option<usize>,
        categories: Option<&[Category]>,
        channel: Option<Channel>,
    ) -> Vec<&Event> {
        messages::get_events(self, limit, categories, channel)
    }

    pub fn get_logs(&self, limit: Option<usize>) -> Vec<&Event> {
        self.events.query(Some(Category::Log), limit)
    }

    pub fn get_reflections(&self, limit: Option<usize>) -> Vec<&Event> {
        self.events.query(Some(Category::Reflection), limit)
    }

    pub fn last_user_message(&self) -> &str {
        messages::last_message_content(self, Role::User)
    }

    pub fn last_assistant_message(&self) -> &str {
        messages::last_message_content(self, Role::Assistant)
    }

    pub fn last_system_message(&self) -> &str {
        messages::last_message_content(self, Role::System)
    }

    pub fn last_log(&self) -> &str {
        messages::last_log(self)
    }

    pub fn render_messages(&self, filter: &MessageFilter) -> String {
        messages::render_messages(self, filter)
    }

    pub fn prepare_context(&self, options: &ContextOptions) -> Vec<ContextMessage> {
        context::prepare_context(self, options)
    }

    // Variables (from variables.rs)
    pub fn set_variable(
        &mut self,
        key: &str,
        value: impl Into<Payload>,
        description: Option<&str>,
    ) -> MemoryResult<Stamp> {
        variables::set_variable(self, key, value.into(), description)
    }

    pub fn delete_variable(&mut self, key: &str) -> MemoryResult<Stamp> {
        variables::delete_variable(self, key)
    }

    pub fn get_variable(&self, key: &str) -> MemoryResult<Option<Payload>> {
        variables::get_variable(self, key)
    }

    pub fn get_variable_raw(&self, key: &str) -> Option<&StoredValue> {
        variables::get_variable_raw(self, key)
    }

    pub fn get_all_variables(&self) -> MemoryResult<BTreeMap<String, Payload>> {
        variables::get_all_variables(self)
    }

    pub fn get_all_variables_raw(&self) -> BTreeMap<String, StoredValue> {
        variables::get_all_variables_raw(self)
    }

    pub fn get_variable_history(
        &self,
        key: &str,
        resolve_references: bool,
    ) -> MemoryResult<Vec<VarEntry>> {
        variables::get_variable_history(self, key, resolve_references)
    }

    pub fn is_variable_deleted(&self, key: &str) -> bool {
        variables::is_variable_deleted(self, key)
    }

    pub fn get_variable_description(&self, key: &str) -> &str {
        variables::get_variable_description(self, key)
    }

    pub fn get_variable_description_history(&self, key: &str) -> &[DescriptionEntry] {
        variables::get_variable_description_history(self, key)
    }

    /// Names of every variable ever set, deleted ones included
    pub fn variable_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.vars.keys().map(String::as_str)
    }

    // Objects (from objects.rs)
    pub fn store_object(
        &mut self,
        data: impl Into<Payload>,
        name: Option<&str>,
        description: Option<&str>,
        content_type: Option<ContentType>,
    ) -> MemoryResult<Stamp> {
        objects::store_object(self, data.into(), name, description, content_type)
    }

    pub fn get_object(&self, stamp: &str) -> MemoryResult<Option<Payload>> {
        objects::get_object(self, stamp)
    }

    pub fn get_object_info(&self, stamp: &str) -> Option<ObjectInfo> {
        objects::get_object_info(self, stamp)
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats::collect(self)
    }

    // Persistence (from persistence.rs)
    pub fn snapshot(&self) -> Snapshot {
        persistence::snapshot(self)
    }

    pub fn rehydrate(
        events: Vec<Event>,
        objects: Option<BTreeMap<Stamp, ObjectRecord>>,
    ) -> MemoryResult<Self> {
        persistence::rehydrate(events, objects)
    }

    pub fn rehydrate_with_id(
        id: Stamp,
        events: Vec<Event>,
        objects: Option<BTreeMap<Stamp, ObjectRecord>>,
    ) -> MemoryResult<Self> {
        persistence::rehydrate_with_id(id, events, objects)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> MemoryResult<Self> {
        persistence::from_snapshot(snapshot)
    }

    pub fn to_portable(&self) -> PortableDocument {
        persistence::to_portable(self)
    }

    pub fn from_portable(document: PortableDocument) -> MemoryResult<Self> {
        persistence::from_portable(document)
    }

    pub fn export_json(&self) -> MemoryResult<String> {
        persistence::export_json(self)
    }

    pub fn export_json_to<P: AsRef<Path>>(&self, path: P) -> MemoryResult<()> {
        persistence::export_json_to(self, path)
    }

    pub fn import_json(json: &str) -> MemoryResult<Self> {
        persistence::import_json(json)
    }

    pub fn import_json_file<P: AsRef<Path>>(path: P) -> MemoryResult<Self> {
        persistence::import_json_file(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, compressed: bool) -> MemoryResult<()> {
        persistence::save(self, path, compressed)
    }

    pub fn load<P: AsRef<Path>>(path: P, compressed: bool) -> MemoryResult<Self> {
        persistence::load(path, compressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_memory_is_empty() {
        let memory = Memory::new();
        assert!(memory.is_empty());
        assert_eq!(memory.id().as_str().len(), stamp::STAMP_LEN);
        assert_eq!(memory.config().object_threshold, 10_000);
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let mut memory = Memory::new();
        for i in 0..50 {
            memory.append_log(format!("line {}", i)).unwrap();
        }

        let times: Vec<_> = memory
            .event_store()
            .iter_chronological()
            .map(|e| e.created_at)
            .collect();
        assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_every_mutation_is_indexed() {
        let mut memory = Memory::new();
        memory
            .append_message(Role::User, "hi", Mode::Text, Channel::Cli)
            .unwrap();
        memory.append_log("log").unwrap();
        memory.append_reflection("hmm").unwrap();
        memory.set_variable("x", 1, None).unwrap();
        memory.delete_variable("x").unwrap();

        assert_eq!(memory.len(), 5);
        let indices = memory.event_store().indices();
        assert_eq!(indices.messages.len(), 1);
        assert_eq!(indices.logs.len(), 1);
        assert_eq!(indices.reflections.len(), 1);
        assert_eq!(indices.variables.len(), 2);
        memory.event_store().verify_consistency().unwrap();

        let last = memory.event_store().index(None).last().unwrap();
        assert_eq!(
            memory.event(last.stamp().as_str()).unwrap().category(),
            Category::Variable
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let mut memory = Memory::new();
        memory.set_variable("x", 1, None).unwrap();

        let copy = memory.clone();
        memory.set_variable("x", 2, None).unwrap();

        assert_eq!(copy.len(), 1);
        assert_eq!(copy.id(), memory.id());
        assert_eq!(
            copy.get_variable("x").unwrap(),
            Some(crate::types::Payload::from(serde_json::json!(1)))
        );
    }
}
