//! Gmail OAuth2 authorization
//!
//! Implements the OAuth2 authorization-code flow for the Gmail API.
//! Uses a local HTTP server to receive the OAuth callback and
//! synchronous HTTP (ureq) to be executor-agnostic.
//!
//! Token refresh is deliberately not modeled: a session lives exactly
//! as long as the process, and a new run signs in again.

use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;

use crate::config::ClientId;

/// The provider rejected the authorization request, or the user
/// declined consent.
#[derive(Debug, thiserror::Error)]
#[error("authorization failed: {error}")]
pub struct AuthorizationError {
    /// Provider error code (e.g. "access_denied")
    pub error: String,
    /// Human-readable detail, when the provider supplies one
    pub error_description: Option<String>,
}

/// Authorization lifecycle of a [`GmailAuth`].
///
/// `Authorizing` drops back to `Configured` when the flow fails;
/// `Authorized` is terminal for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unconfigured,
    Configured,
    Authorizing,
    Authorized,
}

/// An authorized Gmail session holding one bearer token.
///
/// Owned and explicitly passed to the API client; there is no ambient
/// session state. The token is never refreshed.
#[derive(Debug, Clone)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// A session produced by a successful authorization
    pub fn authorized(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A session with no bearer token
    pub fn signed_out() -> Self {
        Self { token: None }
    }

    pub fn signed_in(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, when signed in
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Successful token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Error payload from Google's token endpoint
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    error_description: Option<String>,
}

/// OAuth2 configuration and token acquisition for Gmail
pub struct GmailAuth {
    client_id: Option<String>,
    state: AuthState,
}

impl GmailAuth {
    /// Gmail API OAuth2 endpoints
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Read-only mail scope requested on every sign-in
    const GMAIL_READONLY_SCOPE: &'static str = "https://www.googleapis.com/auth/gmail.readonly";

    /// Port range to try for the local OAuth callback server
    const PORT_RANGE_START: u16 = 8080;
    const PORT_RANGE_END: u16 = 8090;

    /// Create an unconfigured instance. Call [`Self::initialize`] with a
    /// client ID before requesting a token.
    pub fn new() -> Self {
        Self {
            client_id: None,
            state: AuthState::Unconfigured,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Configure the OAuth client identifier.
    ///
    /// Re-invocation with a different identifier reconfigures the flow;
    /// re-invocation with the same identifier is a no-op.
    pub fn initialize(&mut self, client_id: impl Into<String>) {
        let client_id = client_id.into();
        if self.client_id.as_deref() == Some(client_id.as_str()) {
            return;
        }
        self.client_id = Some(client_id);
        self.state = AuthState::Configured;
    }

    /// Run the authorization flow and return a signed-in [`Session`].
    ///
    /// `force_consent` re-prompts the Google consent screen even when
    /// access was previously granted.
    ///
    /// On success the configuring client ID is persisted so later runs
    /// can skip `--client-id`. On failure no partial state is retained
    /// and the flow drops back to `Configured`; a provider rejection is
    /// an [`AuthorizationError`] inside the error chain.
    pub fn request_token(&mut self, force_consent: bool) -> Result<Session> {
        let client_id = match &self.client_id {
            Some(id) => id.clone(),
            None => bail!("no client ID configured; call initialize first"),
        };

        self.state = AuthState::Authorizing;
        match authorize(&client_id, force_consent) {
            Ok(token) => {
                self.state = AuthState::Authorized;
                if let Err(e) = ClientId::new(client_id.as_str()).save() {
                    warn!("failed to persist client ID: {e:#}");
                }
                Ok(Session::authorized(token))
            }
            Err(e) => {
                self.state = AuthState::Configured;
                Err(e)
            }
        }
    }
}

impl Default for GmailAuth {
    fn default() -> Self {
        Self::new()
    }
}

/// Perform the authorization-code flow and return the bearer token
fn authorize(client_id: &str, force_consent: bool) -> Result<String> {
    let (listener, port) = start_local_server()?;
    let redirect_uri = format!("http://localhost:{}", port);

    let mut auth_url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
        GmailAuth::AUTH_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(&redirect_uri),
        urlencoding::encode(GmailAuth::GMAIL_READONLY_SCOPE),
    );
    if force_consent {
        auth_url.push_str("&prompt=consent");
    }

    info!("opening browser for Google sign-in");
    if let Err(e) = open::that(&auth_url) {
        warn!("could not open a browser ({}); visit this URL to continue:", e);
        warn!("{}", auth_url);
    }

    info!("waiting for authorization on port {}", port);
    let code = wait_for_callback(listener)?;

    exchange_code(client_id, &code, &redirect_uri)
}

/// Start a local TCP server on an available port
fn start_local_server() -> Result<(TcpListener, u16)> {
    for port in GmailAuth::PORT_RANGE_START..=GmailAuth::PORT_RANGE_END {
        if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
            return Ok((listener, port));
        }
    }
    bail!(
        "could not bind to any port in range {}-{}",
        GmailAuth::PORT_RANGE_START,
        GmailAuth::PORT_RANGE_END
    )
}

/// Wait for the OAuth callback and extract the authorization code.
///
/// The callback is a single GET whose query string carries either a
/// `code` or an `error` parameter.
fn wait_for_callback(listener: TcpListener) -> Result<String> {
    let (mut stream, _) = listener
        .accept()
        .context("failed to accept the OAuth callback connection")?;

    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .context("failed to read the OAuth callback request")?;

    let (code, declined) = parse_callback(&request_line);

    // Tell the browser the outcome before reporting it to the caller
    let (status, body) = if code.is_some() {
        ("200 OK", "Authentication successful! You can close this window.")
    } else {
        ("400 Bad Request", "Authentication failed. Please try again.")
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
        status, body
    );
    stream.write_all(response.as_bytes()).ok();

    if let Some(error) = declined {
        return Err(AuthorizationError {
            error,
            error_description: None,
        }
        .into());
    }

    let code = code.context("OAuth callback carried no authorization code")?;
    let code = urlencoding::decode(&code)
        .context("authorization code was not valid UTF-8")?
        .into_owned();
    Ok(code)
}

/// Extract the `code` and `error` query parameters from the callback
/// request line (`GET /?code=...&scope=... HTTP/1.1`).
fn parse_callback(request_line: &str) -> (Option<String>, Option<String>) {
    let query = request_line
        .split_whitespace()
        .nth(1)
        .and_then(|path| path.split_once('?'))
        .map(|(_, q)| q);

    match query {
        Some(q) => (query_param(q, "code"), query_param(q, "error")),
        None => (None, None),
    }
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

/// Exchange the authorization code for a bearer token.
///
/// A non-success status with a provider error payload becomes an
/// [`AuthorizationError`].
fn exchange_code(client_id: &str, code: &str, redirect_uri: &str) -> Result<String> {
    let mut response = ureq::post(GmailAuth::TOKEN_URL)
        .config()
        .http_status_as_error(false)
        .build()
        .send_form([
            ("client_id", client_id),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ])
        .context("failed to reach the token endpoint")?;

    if response.status().is_success() {
        let token: TokenResponse = response
            .body_mut()
            .read_json()
            .context("failed to parse token response")?;
        Ok(token.access_token)
    } else {
        let body: TokenErrorBody = response
            .body_mut()
            .read_json()
            .context("token endpoint returned an unreadable error")?;
        Err(AuthorizationError {
            error: body.error,
            error_description: body.error_description,
        }
        .into())
    }
}
