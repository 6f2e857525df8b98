//! Context preparation for model calls

use serde::Serialize;

use crate::types::{Role, Stamp};
use crate::utils::truncate_content;

use super::messages::{get_messages, MessageFilter};
use super::{ContextOptions, Memory};

/// A message prepared for a model context window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextMessage {
    pub role: Role,
    pub content: String,
    /// Stamp of the source event; truncation markers name it
    pub stamp: Stamp,
    pub truncated: bool,
}

/// Messages of the included roles, oldest first, with old long ones shortened
///
/// The most recent `recent_count` messages are returned untouched. Older
/// messages longer than `truncate_threshold` characters keep a header and a
/// footer around a marker naming their stamp.
pub fn prepare_context(memory: &Memory, options: &ContextOptions) -> Vec<ContextMessage> {
    let filter = MessageFilter::new().include_roles(options.include_roles.iter().copied());
    let messages = get_messages(memory, &filter);
    let cutoff = messages.len().saturating_sub(options.recent_count);

    messages
        .into_iter()
        .enumerate()
        .filter_map(|(i, event)| {
            let role = event.role()?;
            let original = event.content().unwrap_or_default();

            let content = if i < cutoff {
                truncate_content(
                    original,
                    event.stamp.as_str(),
                    options.truncate_threshold,
                    options.header_len,
                    options.footer_len,
                )
            } else {
                original.to_string()
            };

            Some(ContextMessage {
                role,
                truncated: content != original,
                content,
                stamp: event.stamp.clone(),
            })
        })
        .collect()
}
