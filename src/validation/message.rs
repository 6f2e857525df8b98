//! Strict parsing of message roles, modes and channels

use std::str::FromStr;

use crate::error::{MemoryError, MemoryResult};
use crate::types::{Category, Channel, Mode, Role};

/// Accepted role names
pub const VALID_ROLES: &[&str] = &[
    "system",
    "user",
    "assistant",
    "reflection",
    "action",
    "query",
    "result",
    "logger",
];

/// Accepted mode names
pub const VALID_MODES: &[&str] = &["text", "audio", "voice"];

/// Accepted channel names
pub const VALID_CHANNELS: &[&str] = &[
    "webapp", "ios", "android", "telegram", "whatsapp", "slack", "api", "cli", "unknown",
];

/// Accepted event category names
pub const VALID_CATEGORIES: &[&str] = &["message", "log", "reflection", "variable"];

fn sorted_list(values: &[&str]) -> String {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.join(", ")
}

/// Parse a role name; names are matched exactly
pub fn validate_role(role: &str) -> MemoryResult<Role> {
    Role::ALL
        .into_iter()
        .find(|r| r.as_str() == role)
        .ok_or_else(|| MemoryError::InvalidRole(role.to_string(), sorted_list(VALID_ROLES)))
}

/// Parse a mode name
pub fn validate_mode(mode: &str) -> MemoryResult<Mode> {
    Mode::ALL
        .into_iter()
        .find(|m| m.as_str() == mode)
        .ok_or_else(|| MemoryError::InvalidMode(mode.to_string(), sorted_list(VALID_MODES)))
}

/// Parse a channel name
pub fn validate_channel(channel: &str) -> MemoryResult<Channel> {
    Channel::ALL
        .into_iter()
        .find(|c| c.as_str() == channel)
        .ok_or_else(|| {
            MemoryError::InvalidChannel(channel.to_string(), sorted_list(VALID_CHANNELS))
        })
}

/// Parse an event category name
pub fn validate_category(category: &str) -> MemoryResult<Category> {
    Category::ALL
        .into_iter()
        .find(|c| c.as_str() == category)
        .ok_or_else(|| {
            MemoryError::InvalidCategory(category.to_string(), sorted_list(VALID_CATEGORIES))
        })
}

impl FromStr for Role {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_role(s)
    }
}

impl FromStr for Mode {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_mode(s)
    }
}

impl FromStr for Channel {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_channel(s)
    }
}

impl FromStr for Category {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_category(s)
    }
}
