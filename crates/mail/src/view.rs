//! Inbox view model
//!
//! An explicit entries/loading/error structure pushed to a rendering
//! surface, replacing implicit display state. Each presentation
//! replaces the previous one wholesale, so stale entries never leak
//! into a new batch.

use chrono::{Local, NaiveDate};
use log::error;
use std::time::Duration;

use crate::fetch::{FetchError, MailApi, fetch_unread};
use crate::models::MessageDetail;
use crate::query::{TimeRange, build_filter};

/// Per-index increment of the entry appearance delay
pub const ENTRY_STAGGER: Duration = Duration::from_millis(50);

/// Banner text shown when a search fails
pub const FETCH_ERROR_BANNER: &str = "Error fetching emails. Please try again.";

/// One rendered list entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCard {
    pub subject: String,
    pub snippet: String,
    /// Cosmetic appearance delay, proportional to the entry's index
    pub enter_delay: Duration,
}

/// Snapshot of the unread list presented to a surface.
///
/// Loading, error, and entries are mutually exclusive; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq)]
pub struct InboxView {
    entries: Vec<EntryCard>,
    loading: bool,
    error: Option<String>,
}

impl InboxView {
    /// The transient state shown from invocation until the fetch resolves
    pub fn loading() -> Self {
        Self {
            entries: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// A completed batch, in fetch order, with staggered entry delays
    pub fn ready(details: Vec<MessageDetail>) -> Self {
        let entries = details
            .into_iter()
            .enumerate()
            .map(|(index, detail)| EntryCard {
                subject: detail.subject,
                snippet: detail.snippet,
                enter_delay: ENTRY_STAGGER * index as u32,
            })
            .collect();
        Self {
            entries,
            loading: false,
            error: None,
        }
    }

    /// A failed batch; nothing from it is rendered
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            loading: false,
            error: Some(message.into()),
        }
    }

    pub fn entries(&self) -> &[EntryCard] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Where view snapshots are displayed
pub trait RenderSurface {
    fn present(&mut self, view: &InboxView);
}

/// Run one search for `range` as of the local date and present the
/// outcome on `surface`. See [`run_search_at`].
pub fn run_search<A, S>(
    api: &A,
    range: TimeRange,
    cap: usize,
    surface: &mut S,
) -> Result<(), FetchError>
where
    A: MailApi + ?Sized,
    S: RenderSurface + ?Sized,
{
    run_search_at(api, range, cap, Local::now().date_naive(), surface)
}

/// Run one search with an explicit `today`.
///
/// Presents the loading view first and always replaces it with either
/// the ready or the failed view, so the loading indicator is cleared on
/// every path. The error is also returned for the caller's exit
/// status; it never carries partial results.
///
/// Searches cannot overlap: the exclusive surface borrow serializes
/// invocations, so a new search never races an in-flight one.
pub fn run_search_at<A, S>(
    api: &A,
    range: TimeRange,
    cap: usize,
    today: NaiveDate,
    surface: &mut S,
) -> Result<(), FetchError>
where
    A: MailApi + ?Sized,
    S: RenderSurface + ?Sized,
{
    surface.present(&InboxView::loading());

    let filter = build_filter(range, today);
    match fetch_unread(api, &filter, cap) {
        Ok(details) => {
            surface.present(&InboxView::ready(details));
            Ok(())
        }
        Err(e) => {
            error!("unread search failed: {}", e);
            surface.present(&InboxView::failed(FETCH_ERROR_BANNER));
            Err(e)
        }
    }
}
