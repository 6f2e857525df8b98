//! Event Memory
//!
//! An event-sourced state store for agentic and conversational systems.
//! Every change (a message, a log line, a reflection, a variable write) is
//! recorded as an immutable, stamped event, and the whole store can be
//! snapshotted and rebuilt by replaying its events.
//!
//! # Features
//!
//! - **Append-only history**: events are never updated or removed
//! - **Variable history**: every write is kept; deletion is a tombstone
//! - **Object store**: large values are compressed and referenced by stamp
//! - **Replay**: snapshots rebuild indices and histories deterministically
//! - **Context preparation**: old long messages are truncated with markers
//!
//! # Modules
//!
//! - `types`: Core data structures (Event, Stamp, Payload, ObjectRecord)
//! - `event_store`: Event map, sorted indices and snapshot documents
//! - `object_store`: Payload compression and the object map
//! - `memory`: The `Memory` aggregate with its read and write operations
//! - `validation`: Role, mode and channel parsing
//! - `utils`: Stamps, clock, atomic writes and truncation
//!
//! # Example
//!
//! ```no_run
//! use event_memory::{Channel, Memory, MessageFilter, Mode, Role};
//!
//! fn main() -> event_memory::MemoryResult<()> {
//!     let mut memory = Memory::new();
//!     memory.append_message(Role::User, "hi", Mode::Text, Channel::Cli)?;
//!     memory.set_variable("topic", "greetings", Some("current topic"))?;
//!
//!     let recent = memory.get_messages(&MessageFilter::new().limit(10));
//!     assert_eq!(recent.len(), 1);
//!
//!     memory.save("memory.json.gz", true)?;
//!     let restored = Memory::load("memory.json.gz", true)?;
//!     assert_eq!(restored.get_variable("topic")?, memory.get_variable("topic")?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod event_store;
pub mod memory;
pub mod object_store;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items at crate root
pub use error::{MemoryError, MemoryResult};
pub use event_store::{PortableDocument, Snapshot};
pub use memory::{
    ContextMessage, ContextOptions, Memory, MemoryConfig, MemoryStats, MessageFilter,
    SharedMemory,
};
pub use types::{
    Category, Channel, ContentType, DescriptionEntry, Event, EventData, Mode, ObjectInfo,
    ObjectRecord, Payload, Role, Stamp, StoredValue, VarEntry, VarValue,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
