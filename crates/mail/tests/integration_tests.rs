//! Integration tests for the mail crate
//!
//! These tests drive the complete search pipeline, from filter
//! construction through fetch to the presented view, against an
//! in-memory provider.

use chrono::NaiveDate;
use mail::gmail::api::{GmailMessage, Header, ListMessagesResponse, MessagePayload, MessageRef};
use mail::{
    FetchError, InboxView, MailApi, MessageId, RenderSurface, TimeRange, run_search_at,
};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory provider serving a fixed set of messages
struct FixtureApi {
    /// (id, subject, snippet) per message, in search-response order
    messages: Vec<(&'static str, Option<&'static str>, &'static str)>,
    queries: Mutex<Vec<String>>,
}

impl FixtureApi {
    fn new(messages: Vec<(&'static str, Option<&'static str>, &'static str)>) -> Self {
        Self {
            messages,
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl MailApi for FixtureApi {
    fn search(&self, query: &str, max_results: usize) -> Result<ListMessagesResponse, FetchError> {
        self.queries.lock().unwrap().push(query.to_string());
        let refs: Vec<MessageRef> = self
            .messages
            .iter()
            .take(max_results)
            .map(|(id, _, _)| MessageRef { id: id.to_string() })
            .collect();
        Ok(ListMessagesResponse {
            messages: if refs.is_empty() { None } else { Some(refs) },
            result_size_estimate: Some(self.messages.len() as u32),
        })
    }

    fn get_message(&self, id: &MessageId) -> Result<GmailMessage, FetchError> {
        let (_, subject, snippet) = self
            .messages
            .iter()
            .find(|(msg_id, _, _)| *msg_id == id.as_str())
            .expect("fixture asked for an unknown message");

        let headers = subject.map(|value| {
            vec![Header {
                name: "Subject".to_string(),
                value: value.to_string(),
            }]
        });

        Ok(GmailMessage {
            id: id.as_str().to_string(),
            snippet: snippet.to_string(),
            payload: Some(MessagePayload { headers }),
        })
    }
}

/// Surface recording every presented snapshot
#[derive(Default)]
struct CaptureSurface {
    views: Vec<InboxView>,
}

impl RenderSurface for CaptureSurface {
    fn present(&mut self, view: &InboxView) {
        self.views.push(view.clone());
    }
}

#[test]
fn test_end_to_end_week_search() {
    // Two unread messages; the second has no Subject header
    let api = FixtureApi::new(vec![
        ("a", Some("Hi"), "hello"),
        ("b", None, "world"),
    ]);
    let mut surface = CaptureSurface::default();
    let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

    run_search_at(&api, TimeRange::Week, 20, today, &mut surface).unwrap();

    // The provider saw the unread filter with the week lower bound
    assert_eq!(
        api.queries.lock().unwrap().as_slice(),
        ["is:unread after:2024/06/03"]
    );

    // Loading first, then the rendered list
    assert_eq!(surface.views.len(), 2);
    assert!(surface.views[0].is_loading());

    let rendered = &surface.views[1];
    assert!(!rendered.is_loading());
    assert!(rendered.error().is_none());

    let entries: Vec<(&str, &str)> = rendered
        .entries()
        .iter()
        .map(|e| (e.subject.as_str(), e.snippet.as_str()))
        .collect();
    assert_eq!(entries, vec![("Hi", "hello"), ("(No Subject)", "world")]);

    // Stagger increases with the index
    assert_eq!(rendered.entries()[0].enter_delay, Duration::ZERO);
    assert_eq!(rendered.entries()[1].enter_delay, Duration::from_millis(50));
}

#[test]
fn test_empty_mailbox_renders_empty_list() {
    let api = FixtureApi::new(vec![]);
    let mut surface = CaptureSurface::default();
    let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

    run_search_at(&api, TimeRange::Month, 20, today, &mut surface).unwrap();

    let rendered = surface.views.last().unwrap();
    assert!(rendered.entries().is_empty());
    assert!(rendered.error().is_none());
    assert!(!rendered.is_loading());
}

#[test]
fn test_range_toggle_restores_original_filter() {
    let api = FixtureApi::new(vec![("a", Some("Hi"), "hello")]);
    let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

    let mut surface = CaptureSurface::default();
    run_search_at(&api, TimeRange::Week, 20, today, &mut surface).unwrap();
    run_search_at(&api, TimeRange::Month, 20, today, &mut surface).unwrap();
    run_search_at(&api, TimeRange::Week, 20, today, &mut surface).unwrap();

    let queries = api.queries.lock().unwrap();
    assert_eq!(queries[0], "is:unread after:2024/06/03");
    assert_eq!(queries[1], "is:unread after:2024/05/10");
    assert_eq!(queries[2], queries[0]);
}
