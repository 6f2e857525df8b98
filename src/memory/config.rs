//! Runtime configuration for a memory

use std::env;

use crate::types::Role;

/// Environment variable overriding the object threshold
pub const OBJECT_THRESHOLD_ENV: &str = "MEMORY_OBJECT_THRESHOLD";

/// Memory configuration
///
/// Runtime-only; it is not part of a snapshot, so a loaded memory starts with
/// the default configuration unless the caller sets one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Values whose estimated size exceeds this many bytes are stored as objects
    pub object_threshold: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            object_threshold: 10_000,
        }
    }
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object_threshold(mut self, object_threshold: usize) -> Self {
        self.object_threshold = object_threshold;
        self
    }

    /// Default configuration with overrides from the environment
    pub fn from_env() -> Self {
        Self::default().with_threshold_override(env::var(OBJECT_THRESHOLD_ENV).ok().as_deref())
    }

    /// Apply a raw threshold value; unparsable input is ignored with a warning
    fn with_threshold_override(self, raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return self;
        };
        match raw.trim().parse::<usize>() {
            Ok(threshold) => self.with_object_threshold(threshold),
            Err(_) => {
                tracing::warn!(value = %raw, "ignoring unparsable {}", OBJECT_THRESHOLD_ENV);
                self
            }
        }
    }
}

/// Options for [`Memory::prepare_context`](super::Memory::prepare_context)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Most recent messages that are never truncated
    pub recent_count: usize,
    /// Older messages longer than this many characters are truncated
    pub truncate_threshold: usize,
    pub header_len: usize,
    pub footer_len: usize,
    pub include_roles: Vec<Role>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            recent_count: 6,
            truncate_threshold: 500,
            header_len: 200,
            footer_len: 200,
            include_roles: vec![Role::User, Role::Assistant],
        }
    }
}

impl ContextOptions {
    pub fn recent_count(mut self, recent_count: usize) -> Self {
        self.recent_count = recent_count;
        self
    }

    pub fn truncate_threshold(mut self, truncate_threshold: usize) -> Self {
        self.truncate_threshold = truncate_threshold;
        self
    }

    pub fn header_len(mut self, header_len: usize) -> Self {
        self.header_len = header_len;
        self
    }

    pub fn footer_len(mut self, footer_len: usize) -> Self {
        self.footer_len = footer_len;
        self
    }

    pub fn include_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.include_roles = roles.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_default_threshold() {
        assert_eq!(MemoryConfig::default().object_threshold, 10_000);
        assert_eq!(
            MemoryConfig::new().with_object_threshold(64).object_threshold,
            64
        );
    }

    #[test]
    fn test_threshold_override() {
        let config = MemoryConfig::default();
        assert_eq!(config.with_threshold_override(None), config);
        assert_eq!(
            config.with_threshold_override(Some(" 2048 ")).object_threshold,
            2048
        );
        assert_eq!(config.with_threshold_override(Some("lots")), config);
        assert_eq!(config.with_threshold_override(Some("-5")), config);
    }

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_from_env() {
        let _guard = ENV_LOCK.lock();

        env::set_var(OBJECT_THRESHOLD_ENV, "512");
        assert_eq!(MemoryConfig::from_env().object_threshold, 512);

        env::set_var(OBJECT_THRESHOLD_ENV, "ten thousand");
        assert_eq!(MemoryConfig::from_env(), MemoryConfig::default());

        env::remove_var(OBJECT_THRESHOLD_ENV);
        assert_eq!(MemoryConfig::from_env(), MemoryConfig::default());
    }

    #[test]
    fn test_context_defaults() {
        let options = ContextOptions::default();
        assert_eq!(options.recent_count, 6);
        assert_eq!(options.truncate_threshold, 500);
        assert_eq!(options.include_roles, vec![Role::User, Role::Assistant]);

        let options = options.recent_count(2).include_roles([Role::System]);
        assert_eq!(options.recent_count, 2);
        assert_eq!(options.include_roles, vec![Role::System]);
    }
}
