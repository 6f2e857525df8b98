//! Event Store - single source of truth for all events
//!
//! The EventStore owns the stamp → event map and the five indices derived
//! from it. `append` is the only write path and there is no update or
//! delete, so the master index always holds exactly the stamps of the map.

use std::collections::HashMap;

use crate::error::{MemoryError, MemoryResult};
use crate::types::{Category, Event, Stamp};

use super::index::{IndexEntry, Indices, SortedIndex};

/// Append-only event map with chronological indices
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: HashMap<Stamp, Event>,
    indices: Indices,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the map and its indices
    ///
    /// Fails without touching any state if an event with the same stamp is
    /// already recorded.
    pub fn append(&mut self, event: Event) -> MemoryResult<()> {
        if self.events.contains_key(&event.stamp) {
            return Err(MemoryError::DuplicateStamp(event.stamp.to_string()));
        }

        let entry = IndexEntry(event.created_at, event.stamp.clone());
        self.indices.insert(event.category(), entry);
        self.events.insert(event.stamp.clone(), event);

        Ok(())
    }

    pub fn get(&self, stamp: &str) -> Option<&Event> {
        self.events.get(stamp)
    }

    pub fn contains(&self, stamp: &str) -> bool {
        self.events.contains_key(stamp)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn indices(&self) -> &Indices {
        &self.indices
    }

    /// Index of one category, or the master index for `None`
    pub fn index(&self, category: Option<Category>) -> &SortedIndex {
        match category {
            Some(category) => self.indices.for_category(category),
            None => &self.indices.all,
        }
    }

    /// Resolve index entries to events, preserving index order
    fn resolve<'a>(&'a self, entries: &'a [IndexEntry]) -> impl Iterator<Item = &'a Event> + 'a {
        entries.iter().filter_map(move |entry| self.events.get(entry.stamp()))
    }

    /// The most recent `limit` events of an index (all when `None`), oldest first
    pub fn query(&self, category: Option<Category>, limit: Option<usize>) -> Vec<&Event> {
        self.resolve(self.index(category).tail(limit)).collect()
    }

    /// Events of an index that pass `filter`, keeping the most recent `limit`
    ///
    /// The filter runs over the whole index before the limit is applied, so
    /// `limit` counts matching events only.
    pub fn query_filtered<F>(
        &self,
        category: Option<Category>,
        limit: Option<usize>,
        filter: F,
    ) -> Vec<&Event>
    where
        F: Fn(&Event) -> bool,
    {
        let mut events: Vec<&Event> = self
            .resolve(self.index(category).entries())
            .filter(|event| filter(*event))
            .collect();

        if let Some(limit) = limit {
            let skip = events.len().saturating_sub(limit);
            events.drain(..skip);
        }
        events
    }

    /// Every event in chronological order
    pub fn iter_chronological(&self) -> impl Iterator<Item = &Event> + '_ {
        self.resolve(self.indices.all.entries())
    }

    /// Check that indices and the event map agree
    ///
    /// The master index must hold exactly the map's stamps, each category
    /// index must hold exactly the stamps of that category, and every index
    /// must be sorted.
    pub fn verify_consistency(&self) -> MemoryResult<()> {
        let all = &self.indices.all;
        if all.len() != self.events.len() || !all.stamps().all(|s| self.events.contains_key(s)) {
            return Err(MemoryError::SnapshotCorrupted(format!(
                "master index holds {} entries for {} events",
                all.len(),
                self.events.len()
            )));
        }
        if !all.is_sorted() {
            return Err(MemoryError::SnapshotCorrupted(
                "master index is not sorted".to_string(),
            ));
        }

        for category in Category::ALL {
            let index = self.indices.for_category(category);
            let expected = self.events.values().filter(|e| e.category() == category).count();
            let matching = index
                .stamps()
                .all(|s| self.events.get(s).map(Event::category) == Some(category));
            if index.len() != expected || !matching || !index.is_sorted() {
                return Err(MemoryError::SnapshotCorrupted(format!(
                    "{} index does not match the event map",
                    category
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, EventData, Mode, Role};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(offset_secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset_secs)
    }

    fn log(stamp: &str, offset: i64, content: &str) -> Event {
        Event::new(
            Stamp::from(stamp),
            at(offset),
            EventData::Log {
                content: content.to_string(),
            },
        )
    }

    fn message(stamp: &str, offset: i64, role: Role) -> Event {
        Event::new(
            Stamp::from(stamp),
            at(offset),
            EventData::Message {
                role,
                content: format!("{} says hi", role),
                mode: Mode::Text,
                channel: Channel::Cli,
            },
        )
    }

    #[test]
    fn test_append_and_query() {
        let mut store = EventStore::new();
        store.append(log("L1", 1, "first")).unwrap();
        store.append(message("M1", 2, Role::User)).unwrap();
        store.append(log("L2", 3, "second")).unwrap();

        assert_eq!(store.len(), 3);

        let logs = store.query(Some(Category::Log), None);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].content(), Some("first"));

        let latest = store.query(None, Some(1));
        assert_eq!(latest[0].stamp.as_str(), "L2");

        store.verify_consistency().unwrap();
    }

    #[test]
    fn test_duplicate_stamp_rejected_without_side_effects() {
        let mut store = EventStore::new();
        store.append(log("S", 1, "original")).unwrap();

        let err = store.append(log("S", 2, "imposter")).unwrap_err();
        assert!(matches!(err, MemoryError::DuplicateStamp(_)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.indices().all.len(), 1);
        assert_eq!(store.get("S").unwrap().content(), Some("original"));
    }

    #[test]
    fn test_out_of_order_append_is_indexed_chronologically() {
        let mut store = EventStore::new();
        store.append(log("late", 10, "late")).unwrap();
        store.append(log("early", 1, "early")).unwrap();

        let order: Vec<&str> = store.iter_chronological().map(|e| e.stamp.as_str()).collect();
        assert_eq!(order, vec!["early", "late"]);
    }

    #[test]
    fn test_query_filtered_applies_limit_after_filter() {
        let mut store = EventStore::new();
        store.append(message("M1", 1, Role::User)).unwrap();
        store.append(message("M2", 2, Role::Assistant)).unwrap();
        store.append(message("M3", 3, Role::User)).unwrap();
        store.append(message("M4", 4, Role::Assistant)).unwrap();

        let users = store.query_filtered(Some(Category::Message), Some(1), |e| {
            e.role() == Some(Role::User)
        });
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].stamp.as_str(), "M3");
    }
}
