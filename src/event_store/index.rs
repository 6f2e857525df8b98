//! Chronologically sorted event indices
//!
//! Each index is a `Vec` of `(created_at, stamp)` pairs kept sorted on every
//! insert by binary search. Insertion is linear in the index length because of
//! the element shift; that is fine for conversational workloads, and the
//! `SortedIndex` API would not change if the `Vec` were swapped for a
//! balanced tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Category, Stamp};

/// A `(timestamp, stamp)` pair; ordered by timestamp, then stamp
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexEntry(pub DateTime<Utc>, pub Stamp);

impl IndexEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn stamp(&self) -> &Stamp {
        &self.1
    }
}

/// Sorted sequence of index entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortedIndex {
    entries: Vec<IndexEntry>,
}

impl SortedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping sort order; equal entries keep insertion order
    pub fn insert(&mut self, entry: IndexEntry) {
        let position = self.entries.partition_point(|existing| existing <= &entry);
        self.entries.insert(position, entry);
    }

    /// The most recent `limit` entries (all when `None`), oldest first
    pub fn tail(&self, limit: Option<usize>) -> &[IndexEntry] {
        match limit {
            Some(n) if n < self.entries.len() => &self.entries[self.entries.len() - n..],
            _ => &self.entries,
        }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn stamps(&self) -> impl Iterator<Item = &Stamp> + '_ {
        self.entries.iter().map(IndexEntry::stamp)
    }

    pub fn last(&self) -> Option<&IndexEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

/// The four category indices plus the master index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Indices {
    pub messages: SortedIndex,
    pub logs: SortedIndex,
    pub reflections: SortedIndex,
    pub variables: SortedIndex,
    pub all: SortedIndex,
}

impl Indices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_category(&self, category: Category) -> &SortedIndex {
        match category {
            Category::Message => &self.messages,
            Category::Log => &self.logs,
            Category::Reflection => &self.reflections,
            Category::Variable => &self.variables,
        }
    }

    fn for_category_mut(&mut self, category: Category) -> &mut SortedIndex {
        match category {
            Category::Message => &mut self.messages,
            Category::Log => &mut self.logs,
            Category::Reflection => &mut self.reflections,
            Category::Variable => &mut self.variables,
        }
    }

    /// Record an event in its category index and the master index
    pub fn insert(&mut self, category: Category, entry: IndexEntry) {
        self.for_category_mut(category).insert(entry.clone());
        self.all.insert(entry);
    }
}
