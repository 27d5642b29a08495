// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unseen-suffix extraction from a conversation's ordered history.

use convoqa_core::types::Message;

/// Messages after the watermark, rendered as analyzer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    /// `[timestamp] sender: content` lines joined by `\n`.
    pub text: String,
    /// Id of the last message in the delta; the next watermark.
    pub last_message_id: String,
    /// Ids of every message in the delta, in order.
    pub message_ids: Vec<String>,
}

impl Delta {
    pub fn len(&self) -> usize {
        self.message_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.message_ids.is_empty()
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.message_ids.iter().any(|id| id == message_id)
    }
}

/// Compute the suffix of `messages` after `last_analyzed_message_id`.
///
/// `messages` must already be in ascending chronological order. Returns
/// `None` when there is nothing new. A watermark that is not in the list
/// yields the whole list.
pub fn compute_delta(messages: &[Message], last_analyzed_message_id: Option<&str>) -> Option<Delta> {
    let start = match last_analyzed_message_id {
        None => 0,
        Some(watermark) => messages
            .iter()
            .position(|m| m.id == watermark)
            .map_or(0, |pos| pos + 1),
    };
    let suffix = &messages[start.min(messages.len())..];
    let last = suffix.last()?;

    let text = suffix
        .iter()
        .map(format_line)
        .collect::<Vec<_>>()
        .join("\n");

    Some(Delta {
        text,
        last_message_id: last.id.clone(),
        message_ids: suffix.iter().map(|m| m.id.clone()).collect(),
    })
}

fn format_line(message: &Message) -> String {
    format!(
        "[{}] {}: {}",
        message.inserted_at, message.sender_name, message.content
    )
}
