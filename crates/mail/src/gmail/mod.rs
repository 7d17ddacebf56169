//! Gmail API integration
//!
//! This module provides:
//! - OAuth2 authorization flow yielding a bearer-token session
//! - Gmail API client for searching and fetching messages
//! - Response normalization to display records

mod auth;
mod client;
mod normalize;

pub use auth::{AuthState, AuthorizationError, GmailAuth, Session};
pub use client::GmailClient;
pub use normalize::{NO_SUBJECT_FALLBACK, normalize_detail};

/// Gmail API response types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from searching messages
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
        /// Total-count metadata reported by the provider (unused)
        pub result_size_estimate: Option<u32>,
    }

    /// Reference to a message returned by a search (just the ID)
    #[derive(Debug, Deserialize)]
    pub struct MessageRef {
        pub id: String,
    }

    /// Full message from the Gmail API
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GmailMessage {
        pub id: String,
        /// Short plain-text excerpt of the message body
        #[serde(default)]
        pub snippet: String,
        pub payload: Option<MessagePayload>,
    }

    /// Message payload containing the header list
    #[derive(Debug, Deserialize)]
    pub struct MessagePayload {
        pub headers: Option<Vec<Header>>,
    }

    /// Email header (name-value pair)
    #[derive(Debug, Deserialize, Serialize)]
    pub struct Header {
        pub name: String,
        pub value: String,
    }
}
