//! Text rendering of session state.
//!
//! Everything here is derived from the session and the latest `QuoteResult`;
//! nothing is stored between renders.
use swap_common::format::{format_amount, rate_line};
use swap_common::session::{RefreshOutcome, Settlement};
use swap_common::{QuoteResult, SwapSession, Symbol};

use crate::feed::IconProbe;

fn side(label: &str, symbol: Option<&Symbol>, session: &SwapSession, icons: &IconProbe) -> String {
    match symbol {
        Some(symbol) => format!(
            "{label}: {symbol}  Balance: {} {symbol}  [{}]",
            format_amount(session.balance_of(symbol)),
            icons.resolve(symbol).url()
        ),
        None => format!("{label}: (none)  Balance: 0"),
    }
}

/// Form view for the current state and `result`.
pub fn render(session: &SwapSession, result: &QuoteResult, icons: &IconProbe) -> Vec<String> {
    let mut lines = vec![
        side("From", session.from(), session, icons),
        side("To  ", session.to(), session, icons),
        format!("Amount: {}", session.amount_text()),
    ];

    match result.quote() {
        Some(quote) => {
            lines.push(format!(
                "You receive: {} {}",
                format_amount(quote.output_amount),
                quote.to
            ));
            lines.push(rate_line(quote));
        }
        None => lines.push("You receive: -".to_string()),
    }

    if let Some(message) = result.message() {
        lines.push(format!("! {}", message));
    }

    let submit = if session.is_pending() {
        "pending"
    } else if result.is_submittable() {
        "ready"
    } else {
        "disabled"
    };
    lines.push(format!("Submit: {}", submit));
    lines
}

/// Catalog timestamp, then one line per symbol with price and balance.
pub fn render_tokens(session: &SwapSession) -> Vec<String> {
    let symbols = session.symbols();
    if symbols.is_empty() {
        return vec!["No prices loaded.".to_string()];
    }
    let mut lines = vec![format!(
        "Prices as of {}",
        session.catalog().built_at().format("%Y-%m-%d %H:%M:%S UTC")
    )];
    lines.extend(symbols.iter().map(|s| {
        let price = session.catalog().price(s).unwrap_or_default();
        format!(
            "{:<8} price {:>14}  balance {}",
            s.as_str(),
            format_amount(price),
            format_amount(session.balance_of(s))
        )
    }));
    lines
}

/// One-line summary of a refresh.
pub fn render_refresh(outcome: &RefreshOutcome) -> Option<String> {
    match outcome {
        RefreshOutcome::Applied(count) => Some(format!("Loaded prices for {} tokens.", count)),
        RefreshOutcome::Failed(_) => Some("Unable to load prices. Please refresh.".to_string()),
        RefreshOutcome::Stale => None,
    }
}

/// Success line for a settled swap.
pub fn render_settlement(settlement: &Settlement) -> String {
    format!(
        "Swapped {} {} → {} {}",
        format_amount(settlement.spent),
        settlement.from,
        format_amount(settlement.received),
        settlement.to
    )
}
