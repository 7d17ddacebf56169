//! Mail library for Glimpse
//!
//! Platform-independent pieces of the unread-mail viewer:
//! - Client ID persistence in the config directory
//! - Gmail OAuth2 authorization yielding a bearer-token session
//! - Search-filter construction for the week/month window
//! - Concurrent fetch pipeline for unread message details
//! - Inbox view model pushed to a rendering surface
//!
//! This crate has zero UI dependencies.

pub mod config;
pub mod fetch;
pub mod gmail;
pub mod models;
pub mod query;
pub mod view;

pub use config::ClientId;
pub use fetch::{DEFAULT_RESULT_CAP, FetchError, MailApi, fetch_unread};
pub use gmail::{
    AuthState, AuthorizationError, GmailAuth, GmailClient, NO_SUBJECT_FALLBACK, Session,
    normalize_detail,
};
pub use models::{MessageDetail, MessageId};
pub use query::{TimeRange, build_filter};
pub use view::{
    ENTRY_STAGGER, EntryCard, FETCH_ERROR_BANNER, InboxView, RenderSurface, run_search,
    run_search_at,
};
