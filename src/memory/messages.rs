//! Messages, logs and reflections

use crate::error::MemoryResult;
use crate::types::{Category, Channel, Event, EventData, Mode, Role, Stamp};
use crate::validation::{validate_channel, validate_mode, validate_role};

use super::Memory;

/// Filter for [`Memory::get_messages`]
///
/// Role and channel filters run before `limit`, so `limit` counts matching
/// messages only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    /// Most recent matching messages to keep (`None` keeps all)
    pub limit: Option<usize>,
    /// Keep only these roles (`None` keeps every role)
    pub include_roles: Option<Vec<Role>>,
    /// Drop these roles
    pub exclude_roles: Vec<Role>,
    pub channel: Option<Channel>,
}

impl MessageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn include_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.include_roles = Some(roles.into_iter().collect());
        self
    }

    pub fn exclude_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.exclude_roles = roles.into_iter().collect();
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    fn matches(&self, event: &Event) -> bool {
        let EventData::Message { role, channel, .. } = &event.data else {
            return false;
        };
        if let Some(include) = &self.include_roles {
            if !include.contains(role) {
                return false;
            }
        }
        if self.exclude_roles.contains(role) {
            return false;
        }
        self.channel.map_or(true, |wanted| wanted == *channel)
    }
}

/// Append a message event
pub fn append_message(
    memory: &mut Memory,
    role: Role,
    content: String,
    mode: Mode,
    channel: Channel,
) -> MemoryResult<Stamp> {
    let seed = content.clone();
    memory.record(
        EventData::Message {
            role,
            content,
            mode,
            channel,
        },
        &seed,
    )
}

/// Append a message given role, mode and channel names
///
/// All three names are validated before anything is recorded.
pub fn append_message_str(
    memory: &mut Memory,
    role: &str,
    content: String,
    mode: &str,
    channel: &str,
) -> MemoryResult<Stamp> {
    let role = validate_role(role)?;
    let mode = validate_mode(mode)?;
    let channel = validate_channel(channel)?;
    append_message(memory, role, content, mode, channel)
}

pub fn append_log(memory: &mut Memory, content: String) -> MemoryResult<Stamp> {
    let seed = content.clone();
    memory.record(EventData::Log { content }, &seed)
}

pub fn append_reflection(memory: &mut Memory, content: String) -> MemoryResult<Stamp> {
    let seed = content.clone();
    memory.record(EventData::Reflection { content }, &seed)
}

pub fn get_messages<'a>(memory: &'a Memory, filter: &MessageFilter) -> Vec<&'a Event> {
    memory
        .events
        .query_filtered(Some(Category::Message), filter.limit, |event| {
            filter.matches(event)
        })
}

/// Events across categories, oldest first
///
/// `categories` of `None` or an empty slice means every category. A channel
/// filter keeps only message events, since no other category carries a channel.
pub fn get_events<'a>(
    memory: &'a Memory,
    limit: Option<usize>,
    categories: Option<&[Category]>,
    channel: Option<Channel>,
) -> Vec<&'a Event> {
    let categories = categories.filter(|wanted| !wanted.is_empty());
    match (categories, channel) {
        (None, None) => memory.events.query(None, limit),
        (Some([category]), None) => memory.events.query(Some(*category), limit),
        _ => memory.events.query_filtered(None, limit, |event| {
            categories.map_or(true, |wanted| wanted.contains(&event.category()))
                && channel.map_or(true, |wanted| event.channel() == Some(wanted))
        }),
    }
}

/// Content of the most recent message with `role`, or an empty string
pub fn last_message_content(memory: &Memory, role: Role) -> &str {
    let index = memory.events.index(Some(Category::Message));
    index
        .entries()
        .iter()
        .rev()
        .filter_map(|entry| memory.events.get(entry.stamp().as_str()))
        .find(|event| event.role() == Some(role))
        .and_then(Event::content)
        .unwrap_or("")
}

/// Content of the most recent log line, or an empty string
pub fn last_log(memory: &Memory) -> &str {
    memory
        .events
        .index(Some(Category::Log))
        .last()
        .and_then(|entry| memory.events.get(entry.stamp().as_str()))
        .and_then(Event::content)
        .unwrap_or("")
}

/// Matching messages as `role: content` lines
pub fn render_messages(memory: &Memory, filter: &MessageFilter) -> String {
    get_messages(memory, filter)
        .into_iter()
        .filter_map(|event| {
            let role = event.role()?;
            Some(format!("{}: {}", role, event.content().unwrap_or_default()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
