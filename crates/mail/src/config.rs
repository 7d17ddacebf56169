//! Client identifier storage
//!
//! Persists the OAuth client ID so the user only has to provide it once.
//! Loading falls back to the GLIMPSE_CLIENT_ID environment variable when
//! no file has been written yet.

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

/// Client ID filename in the Glimpse config directory
const CLIENT_ID_FILE: &str = "client-id.json";

/// Environment variable consulted when no client ID file exists
const CLIENT_ID_ENV: &str = "GLIMPSE_CLIENT_ID";

/// The OAuth client identifier for the Gmail API.
///
/// An opaque string from the Google Cloud Console. At most one value is
/// retained at a time; saving overwrites any previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(String);

/// On-disk shape of the stored client ID
#[derive(Serialize, Deserialize)]
struct StoredClientId {
    client_id: String,
}

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Load the client ID from the config directory, falling back to the
    /// environment. Returns `None` when neither source has a value.
    pub fn load() -> Option<Self> {
        if config::config_exists(CLIENT_ID_FILE) {
            match config::load_json::<StoredClientId>(CLIENT_ID_FILE) {
                Ok(stored) => return Some(Self(stored.client_id)),
                Err(e) => warn!("ignoring unreadable client ID file: {e:#}"),
            }
        }

        std::env::var(CLIENT_ID_ENV).ok().map(Self)
    }

    /// Persist the client ID, overwriting any previously saved value.
    pub fn save(&self) -> Result<()> {
        config::save_json(
            CLIENT_ID_FILE,
            &StoredClientId {
                client_id: self.0.clone(),
            },
        )
    }
}
