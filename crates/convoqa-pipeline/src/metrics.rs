// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket-level time metrics.
//!
//! A ticket covers a span of its conversation's messages. One pass over the
//! span yields first-response time, auto-reply vs. human tallies and the
//! first-contact-resolution flag; resolution time comes from the ticket's
//! own open/close timestamps. All durations are working minutes.

use convoqa_core::types::{Message, Ticket, TicketMetrics};
use convoqa_core::ConvoqaError;
use convoqa_storage::queries::{messages, tickets};
use convoqa_storage::Database;
use tracing::{debug, info, warn};

use crate::calendar::{WorkingCalendar, parse_timestamp};

/// Customer messages allowed in a first-contact resolution: the opening
/// message plus one follow-up.
const FCR_MAX_CUSTOMER_MESSAGES: i64 = 2;

/// Compute a ticket's measures from its messages (ascending by timestamp).
pub fn calculate_ticket_metrics(
    calendar: &WorkingCalendar,
    ticket: &Ticket,
    messages: &[Message],
) -> TicketMetrics {
    let mut first_customer = None;
    let mut first_human = None;
    let mut customer_count = 0;
    let mut auto_reply_count = 0;
    let mut human_response_count = 0;

    for message in messages {
        if !message.is_from_shop {
            customer_count += 1;
            if first_customer.is_none() {
                first_customer = parse_message_time(message);
            }
        } else if message.is_auto_reply {
            auto_reply_count += 1;
        } else {
            human_response_count += 1;
            // A staff message before the customer's first one is not a response.
            if first_human.is_none() && first_customer.is_some() {
                first_human = parse_message_time(message);
            }
        }
    }

    let first_response_minutes = match (first_customer, first_human) {
        (Some(asked), Some(answered)) => Some(calendar.working_minutes_between(asked, answered)),
        _ => None,
    };

    let closed_at = ticket.closed_at.as_deref();
    let created = parse_timestamp(&ticket.created_at);
    if created.is_none() {
        warn!(
            ticket_id = %ticket.ticket_id,
            created_at = %ticket.created_at,
            "unparseable ticket creation time, resolution left unset"
        );
    }
    let resolution_minutes = match (created, closed_at.and_then(parse_timestamp)) {
        (Some(created), Some(closed)) => Some(calendar.working_minutes_between(created, closed)),
        _ => None,
    };

    TicketMetrics {
        first_response_minutes,
        resolution_minutes,
        is_first_contact_resolution: closed_at.is_some()
            && customer_count <= FCR_MAX_CUSTOMER_MESSAGES
            && human_response_count >= 1,
        auto_reply_count,
        human_response_count,
    }
}

fn parse_message_time(message: &Message) -> Option<chrono::DateTime<chrono::Utc>> {
    let parsed = parse_timestamp(&message.inserted_at);
    if parsed.is_none() {
        warn!(
            message_id = %message.id,
            inserted_at = %message.inserted_at,
            "unparseable message timestamp"
        );
    }
    parsed
}

/// The slice of `messages` between the ticket's start and end message ids.
///
/// An absent or unknown start falls back to the first message. An absent,
/// unknown or earlier-than-start end leaves the span open-ended. Both ends
/// are inclusive.
pub fn ticket_span<'a>(messages: &'a [Message], ticket: &Ticket) -> &'a [Message] {
    let position = |id: Option<&str>| id.and_then(|id| messages.iter().position(|m| m.id == id));

    let start = position(ticket.start_message_id.as_deref()).unwrap_or(0);
    let end = match position(ticket.end_message_id.as_deref()) {
        Some(end) if end >= start => end + 1,
        _ => messages.len(),
    };
    &messages[start..end]
}

/// Recompute and store one ticket's measures and date keys.
pub async fn update_ticket_metrics(
    db: &Database,
    calendar: &WorkingCalendar,
    ticket_id: &str,
) -> Result<TicketMetrics, ConvoqaError> {
    let ticket = tickets::get_ticket(db, ticket_id)
        .await?
        .ok_or_else(|| ConvoqaError::NotFound {
            entity: "ticket".into(),
            id: ticket_id.to_string(),
        })?;

    let history = messages::get_messages_for_conversation(db, &ticket.conversation_id).await?;
    let span = ticket_span(&history, &ticket);
    let metrics = calculate_ticket_metrics(calendar, &ticket, span);

    let created_date_key = parse_timestamp(&ticket.created_at).map(|t| calendar.date_key(t));
    let closed_date_key = ticket
        .closed_at
        .as_deref()
        .and_then(parse_timestamp)
        .map(|t| calendar.date_key(t));

    tickets::update_ticket_metrics(db, ticket_id, &metrics, created_date_key, closed_date_key)
        .await?;
    debug!(
        ticket_id,
        span = span.len(),
        first_response = ?metrics.first_response_minutes,
        "ticket metrics updated"
    );
    Ok(metrics)
}

/// Refresh every ticket in id order. A ticket that fails is logged and
/// skipped. Returns how many were refreshed.
pub async fn recalculate_all_ticket_metrics(
    db: &Database,
    calendar: &WorkingCalendar,
) -> Result<usize, ConvoqaError> {
    let ids = tickets::list_ticket_ids(db).await?;
    let mut refreshed = 0;
    for id in &ids {
        match update_ticket_metrics(db, calendar, id).await {
            Ok(_) => refreshed += 1,
            Err(e) => warn!(ticket_id = %id, error = %e, "ticket metrics refresh failed"),
        }
    }
    info!(total = ids.len(), refreshed, "ticket metrics recalculated");
    Ok(refreshed)
}
