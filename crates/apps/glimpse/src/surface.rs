//! Terminal rendering surface
//!
//! Presents inbox view snapshots on stdout/stderr. Entry appearance
//! honors each card's stagger delay.

use mail::{InboxView, RenderSurface};
use std::time::Duration;

/// Line shown when a completed search has no matches
const EMPTY_NOTICE: &str = "No unread messages found within this range.";

/// Renders view snapshots as plain terminal output
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }
}

impl RenderSurface for TerminalSurface {
    fn present(&mut self, view: &InboxView) {
        if view.is_loading() {
            println!("Searching unread mail...");
            return;
        }

        if let Some(message) = view.error() {
            eprintln!("{}", message);
            return;
        }

        if view.entries().is_empty() {
            println!("{}", EMPTY_NOTICE);
            return;
        }

        let mut elapsed = Duration::ZERO;
        for entry in view.entries() {
            std::thread::sleep(entry.enter_delay.saturating_sub(elapsed));
            elapsed = entry.enter_delay;

            println!("{}", entry.subject);
            println!("    {}", entry.snippet);
        }
    }
}
