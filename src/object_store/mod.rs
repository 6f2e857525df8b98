//! Object Store for large payloads
//!
//! Values that are too large to keep inline in the event log are compressed
//! into [`ObjectRecord`]s and kept here, keyed by their own stamp. Records are
//! never evicted: an object stays available after the variable that
//! referenced it has been overwritten or deleted, so the full history can
//! always be resolved.
//!
//! [`ObjectRecord`]: crate::types::ObjectRecord

pub mod codec;
mod store;

pub use codec::{compress, decompress, detect_content_type, estimate_size};
pub use store::ObjectStore;
