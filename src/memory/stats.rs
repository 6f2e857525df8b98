//! Memory statistics
//!
//! Provides a summary of a memory including:
//! - Event counts by category
//! - Live and deleted variable counts
//! - Object store size information

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Category, Stamp};
use crate::utils::format_size;

use super::Memory;

/// Statistics about a memory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    pub id: Stamp,
    /// Total number of events
    pub total_events: usize,
    pub messages: usize,
    pub logs: usize,
    pub reflections: usize,
    pub variable_events: usize,
    /// Variables whose current value is live
    pub live_variables: usize,
    /// Variables whose last entry is a tombstone
    pub deleted_variables: usize,
    pub objects: usize,
    /// Sum of original object sizes in bytes
    pub object_bytes_original: usize,
    /// Sum of compressed object sizes in bytes
    pub object_bytes_compressed: usize,
    pub first_event_at: Option<DateTime<Utc>>,
    pub last_event_at: Option<DateTime<Utc>>,
}

impl MemoryStats {
    /// Collect statistics from a memory
    pub fn collect(memory: &Memory) -> Self {
        let indices = memory.events.indices();
        let (deleted, live): (Vec<_>, Vec<_>) = memory
            .vars
            .values()
            .filter_map(|history| history.last())
            .partition(|entry| entry.value.is_deleted());

        Self {
            id: memory.id.clone(),
            total_events: memory.events.len(),
            messages: indices.for_category(Category::Message).len(),
            logs: indices.for_category(Category::Log).len(),
            reflections: indices.for_category(Category::Reflection).len(),
            variable_events: indices.for_category(Category::Variable).len(),
            live_variables: live.len(),
            deleted_variables: deleted.len(),
            objects: memory.objects.len(),
            object_bytes_original: memory.objects.total_original_size(),
            object_bytes_compressed: memory.objects.total_compressed_size(),
            first_event_at: indices.all.entries().first().map(|e| e.timestamp()),
            last_event_at: indices.all.last().map(|e| e.timestamp()),
        }
    }

    /// Compressed object bytes divided by original bytes (0 with no objects)
    pub fn object_compression_ratio(&self) -> f64 {
        if self.object_bytes_original == 0 {
            0.0
        } else {
            self.object_bytes_compressed as f64 / self.object_bytes_original as f64
        }
    }
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory {}", self.id)?;
        writeln!(
            f,
            "  events:      {} ({} messages, {} logs, {} reflections, {} variable changes)",
            self.total_events, self.messages, self.logs, self.reflections, self.variable_events
        )?;
        writeln!(
            f,
            "  variables:   {} live, {} deleted",
            self.live_variables, self.deleted_variables
        )?;
        writeln!(
            f,
            "  objects:     {} ({} -> {}, ratio {:.2})",
            self.objects,
            format_size(self.object_bytes_original as u64),
            format_size(self.object_bytes_compressed as u64),
            self.object_compression_ratio()
        )?;
        match (self.first_event_at, self.last_event_at) {
            (Some(first), Some(last)) => write!(f, "  timeline:    {} .. {}", first, last),
            _ => write!(f, "  timeline:    empty"),
        }
    }
}
