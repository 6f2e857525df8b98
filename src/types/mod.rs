//! Data types for the event memory
//!
//! This module contains the core data structures shared by the event store,
//! the object store and the memory aggregate.

mod event;
mod message;
mod object;
mod stamp;
mod value;

pub use event::{Category, Event, EventData};
pub use message::{Channel, Mode, Role};
pub use object::{ContentType, ObjectInfo, ObjectRecord};
pub use stamp::Stamp;
pub use value::{DescriptionEntry, Payload, StoredValue, VarEntry, VarValue};
