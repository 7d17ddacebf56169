//! Gmail API HTTP client
//!
//! Implements the fetch pipeline's [`MailApi`] seam over the Gmail
//! REST API. Uses synchronous HTTP (ureq) to be executor-agnostic.

use log::debug;

use super::Session;
use super::api::{GmailMessage, ListMessagesResponse};
use crate::fetch::{FetchError, MailApi};
use crate::models::MessageId;

/// Gmail API client for searching and fetching messages.
///
/// Holds the [`Session`] it was constructed with; the session is only
/// read here, never written.
pub struct GmailClient {
    session: Session,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Provider-side ceiling on search page size
    const MAX_RESULTS_LIMIT: usize = 500;

    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn bearer(&self) -> Result<&str, FetchError> {
        self.session.bearer().ok_or(FetchError::SignedOut)
    }
}

impl MailApi for GmailClient {
    fn search(&self, query: &str, max_results: usize) -> Result<ListMessagesResponse, FetchError> {
        let token = self.bearer()?;

        let url = format!(
            "{}/users/me/messages?q={}&maxResults={}",
            Self::BASE_URL,
            urlencoding::encode(query),
            max_results.min(Self::MAX_RESULTS_LIMIT)
        );
        debug!("searching messages: {}", query);

        let mut response = ureq::get(&url)
            .header("Authorization", &format!("Bearer {}", token))
            .call()
            .map_err(FetchError::Search)?;

        response.body_mut().read_json().map_err(FetchError::Search)
    }

    fn get_message(&self, id: &MessageId) -> Result<GmailMessage, FetchError> {
        let token = self.bearer()?;

        let url = format!(
            "{}/users/me/messages/{}?format=full",
            Self::BASE_URL,
            id.as_str()
        );

        let mut response = ureq::get(&url)
            .header("Authorization", &format!("Bearer {}", token))
            .call()
            .map_err(|e| FetchError::Detail {
                id: id.as_str().to_string(),
                source: e,
            })?;

        response.body_mut().read_json().map_err(|e| FetchError::Detail {
            id: id.as_str().to_string(),
            source: e,
        })
    }
}
