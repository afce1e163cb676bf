//! Swap Client — a terminal token-swap form. It loads a price feed, seeds
//! simulated balances, and quotes swaps as the amount and tokens change.
//! Submitting a valid quote settles it against the simulated balances after a
//! short artificial delay.
//!
//! Usage example (CLI):
//! ```bash
//! swap_client --from usdc --to eth --amount 12.5
//! swap_client --prices-file ./prices.json --once --json --from atom --to usdc --amount 3
//! ```
//!
//! Without `--once` the client reads console commands from stdin; see
//! `console` for the command list.
#![warn(missing_docs)]
mod args;
mod console;
mod feed;
mod view;

use crate::args::Args;
use crate::console::Console;
use crate::feed::{FeedWorker, FilePriceSource, HttpPriceSource, IconProbe, PriceSource};
use clap::Parser;
use crossbeam_channel::bounded;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;
use swap_common::Result;
use swap_common::SwapError;
use swap_common::session::RefreshOutcome;
use swap_common::{QuoteResult, SwapSession};

fn main() -> Result<(), SwapError> {
    init_logger();
    let args = Args::parse();

    let source: Box<dyn PriceSource> = match &args.prices_file {
        Some(path) => Box::new(FilePriceSource::new(normalize_path(path))),
        None => Box::new(HttpPriceSource::new(&args.price_url)?),
    };
    let worker = FeedWorker::start(source);
    let icons = IconProbe::new(&args.icon_base, args.probe_icons);
    let session = SwapSession::new(args.seed_policy());
    let mut console = Console::new(
        session,
        worker,
        icons,
        Duration::from_millis(args.settle_delay_ms),
    );

    info!("Loading prices...");
    console.refresh()?;
    match console.wait_for_prices()? {
        RefreshOutcome::Applied(count) => info!("Loaded prices for {} tokens", count),
        other => warn!("Starting without fresh prices: {:?}", other),
    }
    apply_startup_selection(&args, console.session_mut());

    if args.once {
        return print_once(&console, args.json);
    }

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| SwapError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;

    for line in console.status_lines() {
        println!("{}", line);
    }
    console.run(shutdown_rx)
}

/// Applies `--from`, `--to` and `--amount`. Unknown tokens are reported and
/// leave the default selection in place.
fn apply_startup_selection(args: &Args, session: &mut SwapSession) {
    if let Some(from) = &args.from {
        if let Err(e) = session.select_from(from) {
            warn!("Ignoring --from: {}", e);
        }
    }
    if let Some(to) = &args.to {
        if let Err(e) = session.select_to(to) {
            warn!("Ignoring --to: {}", e);
        }
    }
    if let Some(amount) = &args.amount {
        session.set_amount(amount.as_str());
    }
}

fn print_once(console: &Console, json: bool) -> Result<()> {
    if !json {
        for line in console.status_lines() {
            println!("{}", line);
        }
        return Ok(());
    }
    let body = once_json(&console.session().evaluate());
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// `--json` body: always a `status`, plus the quote and message when present.
fn once_json(result: &QuoteResult) -> serde_json::Value {
    match result {
        QuoteResult::Valid(quote) => serde_json::json!({
            "status": "valid",
            "quote": quote,
        }),
        QuoteResult::Empty => serde_json::json!({ "status": "empty" }),
        QuoteResult::Invalid(rejection) => serde_json::json!({
            "status": "invalid",
            "message": rejection.user_message(),
            "quote": rejection.quote(),
        }),
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
