//! Gmail API response normalization
//!
//! Reduces full API messages to the records the unread list displays.

use super::api::{GmailMessage, MessagePayload};
use crate::models::MessageDetail;

/// Literal substituted when a message has no usable Subject header
pub const NO_SUBJECT_FALLBACK: &str = "(No Subject)";

/// Reduce a Gmail API message to its display record.
///
/// The subject comes from the message's header list; a missing or empty
/// Subject header falls back to [`NO_SUBJECT_FALLBACK`]. The snippet is
/// taken verbatim from the provider.
pub fn normalize_detail(message: GmailMessage) -> MessageDetail {
    let subject = message
        .payload
        .as_ref()
        .and_then(|p| extract_header(p, "Subject"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_SUBJECT_FALLBACK.to_string());

    MessageDetail {
        subject,
        snippet: message.snippet,
    }
}

/// Extract a header value by name
fn extract_header(payload: &MessagePayload, name: &str) -> Option<String> {
    payload.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}
