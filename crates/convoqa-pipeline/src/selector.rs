// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Candidate selection over the full conversation set.

use convoqa_core::types::Conversation;
use convoqa_core::ConvoqaError;
use convoqa_storage::queries::conversations;
use convoqa_storage::Database;
use tracing::debug;

/// Every conversation whose unanalyzed backlog reaches `threshold`, ordered by id.
///
/// With `threshold == 0` this includes fully analyzed conversations; the
/// reconciler's empty-delta check is what filters those out.
pub async fn select_candidates(
    db: &Database,
    threshold: u32,
) -> Result<Vec<Conversation>, ConvoqaError> {
    let candidates = conversations::select_candidates(db, threshold).await?;
    debug!(threshold, count = candidates.len(), "candidates selected");
    Ok(candidates)
}
