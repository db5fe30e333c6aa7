//! Variant picker CLI - Pick product variants from a catalog search.
//!
//! # Usage
//!
//! ```bash
//! # Open a picker on the first page of "Hat" results
//! variant-picker --query Hat
//!
//! # Never refetch when the search text changes
//! variant-picker --clear-only
//! ```
//!
//! The picker reads commands from stdin (`help` lists them) and, once
//! confirmed or cancelled, prints the selected variant keys to stdout as a
//! JSON array. End of input cancels. Logs go to stderr.
//!
//! # Environment Variables
//!
//! See `variant_picker::config`. `CATALOG_API_KEY` is required.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use sentry::integrations::tracing as sentry_tracing;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use variant_picker::catalog::CatalogClient;
use variant_picker::config::{AppConfig, PickerOptions};
use variant_picker::fetch::FetchApplied;
use variant_picker::search::SearchPolicy;
use variant_picker::{PickerError, PickerSession, SessionUpdate};

mod commands;

use commands::{Command, USAGE, render};

#[derive(Parser)]
#[command(name = "variant-picker")]
#[command(author, version, about = "Pick product variants from a catalog search")]
struct Cli {
    /// Search text for the initial fetch
    #[arg(short, long)]
    query: Option<String>,

    /// Page number to fetch (1-based)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page: Option<u32>,

    /// Page size
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    limit: Option<u32>,

    /// Clear the list on search edits instead of refetching
    #[arg(long, conflicts_with = "debounce_ms")]
    clear_only: bool,

    /// Quiet period before a search edit triggers a refetch
    #[arg(long)]
    debounce_ms: Option<u64>,
}

impl Cli {
    /// Apply command-line overrides on top of the environment options.
    fn apply(self, options: &mut PickerOptions) {
        if let Some(query) = self.query {
            options.initial_query = query;
        }
        if let Some(page) = self.page {
            options.page = page;
        }
        if let Some(limit) = self.limit {
            options.limit = limit;
        }
        if self.clear_only {
            options.search = SearchPolicy::ClearOnly;
        } else if let Some(ms) = self.debounce_ms {
            options.search = SearchPolicy::Refetch {
                debounce: Duration::from_millis(ms),
            };
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // stdout carries the result, so logs go to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "variant_picker=info,variant_picker_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Picker failed: {e}");
        std::process::exit(1);
    }
}

/// What the loop woke up for.
enum Input {
    Line(Option<String>),
    Update(Option<SessionUpdate>),
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env()?;
    let _sentry_guard = init_sentry(&config);
    cli.apply(&mut config.picker);

    let (result_tx, result_rx) = oneshot::channel();
    let mut session = PickerSession::connect(&config, move |keys| {
        // The receiver only goes away if `run` already returned.
        let _ = result_tx.send(keys);
    })?;

    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    writeln!(stdout, "{USAGE}")?;
    render::list(&mut stdout, session.picker())?;

    while session.picker().is_open() {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            update = session.next_update(), if session.has_pending_work() => Input::Update(update),
        };

        match input {
            Input::Line(None) => {
                tracing::info!("stdin closed, cancelling picker");
                session.cancel()?;
            }
            Input::Line(Some(line)) => match line.parse::<Command>() {
                Ok(command) => execute(&mut session, command, &mut stdout)?,
                Err(e) => writeln!(stdout, "{e}")?,
            },
            Input::Update(Some(SessionUpdate::FetchCompleted {
                applied: FetchApplied::Applied,
                ..
            })) => render::list(&mut stdout, session.picker())?,
            Input::Update(Some(SessionUpdate::FetchStarted { .. })) => {
                writeln!(stdout, "loading...")?;
            }
            Input::Update(_) => {}
        }
    }

    let keys = result_rx.await.unwrap_or_default();
    render::result(&mut stdout, &keys)?;
    Ok(())
}

/// Run one command. Invalid positions are reported and the loop carries on.
fn execute(
    session: &mut PickerSession<CatalogClient>,
    command: Command,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = match command {
        Command::Search(text) => session.set_query(text).map(|_| true),
        Command::Variant { product, variant } => session
            .picker_mut()
            .toggle_variant_at(product, variant)
            .map(|()| true),
        Command::Product(product) => session.picker_mut().toggle_product_at(product).map(|()| true),
        Command::Refresh => session.start_fetch().map(|_| true),
        Command::List => Ok(true),
        Command::Confirm => session.confirm().map(|()| false),
        Command::Cancel => session.cancel().map(|()| false),
        Command::Help => {
            writeln!(out, "{USAGE}")?;
            Ok(false)
        }
    };

    match outcome {
        Ok(true) => render::list(out, session.picker())?,
        Ok(false) => {}
        Err(e @ PickerError::InvalidArgument(_)) => writeln!(out, "{e}")?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
