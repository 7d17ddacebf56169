//! Glimpse - a read-only viewer for recent unread Gmail
//!
//! Signs in through Google OAuth2, searches unread messages within the
//! selected time window, and renders subject/snippet cards to the
//! terminal.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use mail::{
    AuthorizationError, ClientId, DEFAULT_RESULT_CAP, FetchError, GmailAuth, GmailClient,
    TimeRange, run_search,
};

mod surface;

use surface::TerminalSurface;

#[derive(Parser)]
#[command(name = "glimpse", version, about = "View recent unread Gmail messages")]
struct Cli {
    /// Time window to search
    #[arg(long, value_enum, default_value_t = RangeArg::Week)]
    range: RangeArg,

    /// Maximum number of messages to fetch
    #[arg(long, default_value_t = DEFAULT_RESULT_CAP)]
    max_results: usize,

    /// OAuth client ID from the Google Cloud Console; remembered for
    /// later runs
    #[arg(long)]
    client_id: Option<String>,

    /// Re-prompt the Google consent screen even if access was
    /// previously granted
    #[arg(long)]
    force_consent: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RangeArg {
    Week,
    Month,
}

impl From<RangeArg> for TimeRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::Week => TimeRange::Week,
            RangeArg::Month => TimeRange::Month,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run() {
        if let Some(auth_err) = e.downcast_ref::<AuthorizationError>() {
            eprintln!("Sign-in failed: {}", auth_err.error);
            if let Some(description) = &auth_err.error_description {
                eprintln!("{}", description);
            }
            eprintln!("Run glimpse again to retry sign-in.");
        } else if e.downcast_ref::<FetchError>().is_some() {
            // The surface already showed the error banner
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    config::init().context("failed to initialize config directory")?;

    // A freshly supplied client ID skips the consent re-prompt, the way
    // a saved one asks for it
    let (client_id, from_store) = match cli.client_id {
        Some(id) => (ClientId::new(id), false),
        None => {
            let id = ClientId::load().context(
                "no client ID configured; pass --client-id once to store it \
                 (or set GLIMPSE_CLIENT_ID)",
            )?;
            (id, true)
        }
    };

    let mut auth = GmailAuth::new();
    auth.initialize(client_id.as_str());

    let session = auth.request_token(cli.force_consent || from_store)?;
    info!("signed in");

    let client = GmailClient::new(session);
    let mut surface = TerminalSurface::new();

    match run_search(&client, cli.range.into(), cli.max_results, &mut surface) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("search did not complete: {}", e);
            Err(e.into())
        }
    }
}
