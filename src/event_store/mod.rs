//! Event Store Module for Event Sourcing
//!
//! This module provides the event sourcing core of a memory:
//! - `EventStore`: append-only stamp → event map, the single source of truth
//! - `SortedIndex` / `Indices`: chronological `(timestamp, stamp)` indices
//! - `Snapshot` / `PortableDocument`: exported state and its file format
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌──────────┐    ┌──────────────┐    ┌──────────────────┐    ┌──────────────┐
//! │ mutation │───►│ new stamp +  │───►│ EventStore map   │───►│ category idx │
//! │ call     │    │ timestamp    │    │ insert           │    │ + master idx │
//! └──────────┘    └──────────────┘    └──────────────────┘    └──────────────┘
//!
//! Read Path:
//! ┌──────────────┐    ┌──────────────────┐
//! │ index tail / │───►│ resolve stamps   │───► events, oldest first
//! │ filter scan  │    │ in EventStore    │
//! └──────────────┘    └──────────────────┘
//! ```

mod index;
mod snapshot;
mod store;

pub use index::{IndexEntry, Indices, SortedIndex};
pub use snapshot::{
    check_version, read_document, write_document, PortableDocument, Snapshot, FORMAT_VERSION,
};
pub use store::EventStore;
