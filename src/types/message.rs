//! Message enumerations: role, mode and channel
//!
//! These are the only validated fields in the store. Parsing from strings
//! lives in [`crate::validation`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Reflection,
    Action,
    Query,
    Result,
    Logger,
}

impl Role {
    /// Every accepted role
    pub const ALL: [Role; 8] = [
        Role::System,
        Role::User,
        Role::Assistant,
        Role::Reflection,
        Role::Action,
        Role::Query,
        Role::Result,
        Role::Logger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Reflection => "reflection",
            Role::Action => "action",
            Role::Query => "query",
            Role::Result => "result",
            Role::Logger => "logger",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Communication mode of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Text,
    Audio,
    Voice,
}

impl Mode {
    /// Every accepted mode
    pub const ALL: [Mode; 3] = [Mode::Text, Mode::Audio, Mode::Voice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Text => "text",
            Mode::Audio => "audio",
            Mode::Voice => "voice",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surface a message arrived from or is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Webapp,
    Ios,
    Android,
    Telegram,
    Whatsapp,
    Slack,
    Api,
    Cli,
    #[default]
    Unknown,
}

impl Channel {
    /// Every accepted channel
    pub const ALL: [Channel; 9] = [
        Channel::Webapp,
        Channel::Ios,
        Channel::Android,
        Channel::Telegram,
        Channel::Whatsapp,
        Channel::Slack,
        Channel::Api,
        Channel::Cli,
        Channel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Webapp => "webapp",
            Channel::Ios => "ios",
            Channel::Android => "android",
            Channel::Telegram => "telegram",
            Channel::Whatsapp => "whatsapp",
            Channel::Slack => "slack",
            Channel::Api => "api",
            Channel::Cli => "cli",
            Channel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
