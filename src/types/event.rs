//! Event types for the append-only event log
//!
//! Every state change in a memory is recorded as an immutable [`Event`].
//! The current state is derived by replaying events in timestamp order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Channel, Mode, Role, Stamp, VarValue};

/// Category of an event; each category has its own index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A conversational message
    Message,
    /// An internal log line
    Log,
    /// An internal reflection
    Reflection,
    /// A variable was set or deleted
    Variable,
}

impl Category {
    /// Every category, in index order
    pub const ALL: [Category; 4] = [
        Category::Message,
        Category::Log,
        Category::Reflection,
        Category::Variable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Message => "message",
            Category::Log => "log",
            Category::Reflection => "reflection",
            Category::Variable => "variable",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category-specific payload of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum EventData {
    Message {
        role: Role,
        content: String,
        mode: Mode,
        channel: Channel,
    },
    Log {
        content: String,
    },
    Reflection {
        content: String,
    },
    Variable {
        key: String,
        value: VarValue,
        /// Description supplied with this change, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl EventData {
    pub fn category(&self) -> Category {
        match self {
            EventData::Message { .. } => Category::Message,
            EventData::Log { .. } => Category::Log,
            EventData::Reflection { .. } => Category::Reflection,
            EventData::Variable { .. } => Category::Variable,
        }
    }
}

/// An immutable event in the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier of the event
    pub stamp: Stamp,

    /// When the event occurred; replay order is by this field
    pub created_at: DateTime<Utc>,

    pub data: EventData,
}

impl Event {
    pub fn new(stamp: Stamp, created_at: DateTime<Utc>, data: EventData) -> Self {
        Self {
            stamp,
            created_at,
            data,
        }
    }

    pub fn category(&self) -> Category {
        self.data.category()
    }

    /// Text content of message, log and reflection events
    pub fn content(&self) -> Option<&str> {
        match &self.data {
            EventData::Message { content, .. }
            | EventData::Log { content }
            | EventData::Reflection { content } => Some(content),
            EventData::Variable { .. } => None,
        }
    }

    /// Role of a message event
    pub fn role(&self) -> Option<Role> {
        match &self.data {
            EventData::Message { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Channel of a message event; other categories carry no channel
    pub fn channel(&self) -> Option<Channel> {
        match &self.data {
            EventData::Message { channel, .. } => Some(*channel),
            _ => None,
        }
    }

    /// One-line human-readable description of the change
    pub fn summary(&self) -> String {
        match &self.data {
            EventData::Message { role, content, .. } => format!("{}: {}", role, content),
            EventData::Log { content } => format!("log: {}", content),
            EventData::Reflection { content } => format!("reflection: {}", content),
            EventData::Variable { key, value, .. } => match value {
                VarValue::Deleted => format!("Variable '{}' deleted", key),
                VarValue::Live(stored) if stored.is_object_ref() => {
                    format!("Variable '{}' set (as object ref)", key)
                }
                VarValue::Live(_) => format!("Variable '{}' set", key),
            },
        }
    }

    /// Serialize event to a single JSON line
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize event from a JSON line
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
