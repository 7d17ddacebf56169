//! Unread-mail fetch pipeline
//!
//! Searches for messages matching a filter and fans out one detail
//! fetch per result. Detail fetches run concurrently and are joined
//! before anything is returned: a single failure fails the whole
//! batch, so callers never see partial results.

use log::debug;
use rayon::prelude::*;

use crate::gmail::api::{GmailMessage, ListMessagesResponse};
use crate::gmail::normalize_detail;
use crate::models::{MessageDetail, MessageId};

/// Default bound on search results
pub const DEFAULT_RESULT_CAP: usize = 20;

/// Network or provider failure during search or detail retrieval
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("not signed in")]
    SignedOut,
    #[error("message search failed")]
    Search(#[source] ureq::Error),
    #[error("failed to fetch message {id}")]
    Detail {
        id: String,
        #[source]
        source: ureq::Error,
    },
}

/// Operations the fetch pipeline needs from the mail provider.
///
/// [`crate::GmailClient`] implements this over HTTP; tests substitute
/// an in-memory fake.
pub trait MailApi: Send + Sync {
    /// Search for message IDs matching a filter string
    fn search(&self, query: &str, max_results: usize) -> Result<ListMessagesResponse, FetchError>;

    /// Fetch full details for one message
    fn get_message(&self, id: &MessageId) -> Result<GmailMessage, FetchError>;
}

/// Search for messages matching `filter` and fetch their details,
/// bounded by `cap`.
///
/// Details are returned in the order the search reported them,
/// regardless of detail-fetch completion order. An empty search yields
/// an empty vec without issuing any detail fetches.
pub fn fetch_unread<A>(api: &A, filter: &str, cap: usize) -> Result<Vec<MessageDetail>, FetchError>
where
    A: MailApi + ?Sized,
{
    let listing = api.search(filter, cap)?;
    let refs = listing.messages.unwrap_or_default();
    if refs.is_empty() {
        debug!("search returned no messages");
        return Ok(Vec::new());
    }

    let ids: Vec<MessageId> = refs
        .iter()
        .take(cap)
        .map(|r| MessageId::new(&r.id))
        .collect();
    debug!("fetching details for {} messages", ids.len());

    // The collect short-circuits on the first error and otherwise
    // preserves the search order.
    let messages: Vec<GmailMessage> = ids
        .par_iter()
        .map(|id| api.get_message(id))
        .collect::<Result<_, _>>()?;

    Ok(messages.into_iter().map(normalize_detail).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::{Header, MessagePayload, MessageRef};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory provider whose details carry the message ID as subject
    struct FakeApi {
        ids: Vec<&'static str>,
        fail_id: Option<&'static str>,
        /// Delay earlier messages so later fetches complete first
        scramble_completion: bool,
        detail_calls: AtomicUsize,
    }

    impl FakeApi {
        fn new(ids: Vec<&'static str>) -> Self {
            Self {
                ids,
                fail_id: None,
                scramble_completion: false,
                detail_calls: AtomicUsize::new(0),
            }
        }
    }

    impl MailApi for FakeApi {
        fn search(
            &self,
            _query: &str,
            _max_results: usize,
        ) -> Result<ListMessagesResponse, FetchError> {
            let refs: Vec<MessageRef> = self
                .ids
                .iter()
                .map(|id| MessageRef { id: id.to_string() })
                .collect();
            Ok(ListMessagesResponse {
                messages: if refs.is_empty() { None } else { Some(refs) },
                result_size_estimate: Some(self.ids.len() as u32),
            })
        }

        fn get_message(&self, id: &MessageId) -> Result<GmailMessage, FetchError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);

            if self.scramble_completion {
                let index = self.ids.iter().position(|i| *i == id.as_str()).unwrap();
                let remaining = self.ids.len() - index;
                std::thread::sleep(Duration::from_millis(remaining as u64 * 10));
            }

            if self.fail_id == Some(id.as_str()) {
                return Err(FetchError::Detail {
                    id: id.as_str().to_string(),
                    source: ureq::Error::StatusCode(500),
                });
            }

            Ok(GmailMessage {
                id: id.as_str().to_string(),
                snippet: format!("snippet of {}", id.as_str()),
                payload: Some(MessagePayload {
                    headers: Some(vec![Header {
                        name: "Subject".to_string(),
                        value: format!("Subject {}", id.as_str()),
                    }]),
                }),
            })
        }
    }

    #[test]
    fn test_zero_results_issue_no_detail_fetches() {
        let api = FakeApi::new(vec![]);

        let details = fetch_unread(&api, "is:unread after:2024/06/03", 20).unwrap();

        assert!(details.is_empty());
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_order_follows_search_response() {
        let mut api = FakeApi::new(vec!["m1", "m2", "m3", "m4"]);
        api.scramble_completion = true;

        let details = fetch_unread(&api, "is:unread", 20).unwrap();

        let subjects: Vec<&str> = details.iter().map(|d| d.subject.as_str()).collect();
        assert_eq!(
            subjects,
            vec!["Subject m1", "Subject m2", "Subject m3", "Subject m4"]
        );
    }

    #[test]
    fn test_single_detail_failure_fails_whole_batch() {
        let mut api = FakeApi::new(vec!["m1", "m2", "m3"]);
        api.fail_id = Some("m2");

        let result = fetch_unread(&api, "is:unread", 20);

        match result {
            Err(FetchError::Detail { id, .. }) => assert_eq!(id, "m2"),
            other => panic!("expected a detail failure, got {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn test_cap_bounds_detail_fetches() {
        let api = FakeApi::new(vec!["m1", "m2", "m3", "m4", "m5"]);

        let details = fetch_unread(&api, "is:unread", 3).unwrap();

        assert_eq!(details.len(), 3);
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_snippets_carried_through() {
        let api = FakeApi::new(vec!["m1"]);

        let details = fetch_unread(&api, "is:unread", 20).unwrap();

        assert_eq!(details[0].snippet, "snippet of m1");
    }
}
