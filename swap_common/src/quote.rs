//! Quote evaluation.
//!
//! [`evaluate`] turns a [`QuoteRequest`] into exactly one [`QuoteResult`]
//! using nothing but the request, the catalog and the ledger. Validation is an
//! ordered table of rules ([`VALIDATION_RULES`]); the first rule that returns a
//! result decides, and a request that passes every rule is `Valid`.
//!
//! Precedence, highest first:
//!
//! | rule            | outcome                                   |
//! |-----------------|-------------------------------------------|
//! | `selection`     | both tokens must be chosen                |
//! | `distinct`      | tokens must differ                        |
//! | `amount_given`  | unparsable or blank amount → `Empty`      |
//! | `amount_range`  | amount must be positive                   |
//! | `priced`        | both tokens must have a catalog price     |
//! | `funded`        | amount must not exceed the source balance |
//! | `output`        | output must be finite and positive        |
//!
//! Token selection outranks the empty-amount state, so an unselected pair is
//! reported even before anything is typed.
use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::PriceCatalog;
use crate::format::format_amount;
use crate::ledger::BalanceLedger;
use crate::symbol::Symbol;

/// One evaluation input, rebuilt on every edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteRequest {
    /// Token being spent; `None` when unselected.
    pub from: Option<Symbol>,
    /// Token being received; `None` when unselected.
    pub to: Option<Symbol>,
    /// Amount exactly as typed.
    pub amount_text: String,
}

impl QuoteRequest {
    /// Builds a request from raw selector values; blank values mean unselected.
    pub fn new(from: &str, to: &str, amount_text: impl Into<String>) -> Self {
        Self {
            from: Symbol::parse(from),
            to: Symbol::parse(to),
            amount_text: amount_text.into(),
        }
    }
}

/// Computed exchange for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Spent token.
    pub from: Symbol,
    /// Received token.
    pub to: Symbol,
    /// Parsed amount of `from`.
    pub input_amount: f64,
    /// `input_amount * price(from) / price(to)`.
    pub output_amount: f64,
    /// Units of `to` per unit of `from`.
    pub rate: f64,
    /// Units of `from` per unit of `to`.
    pub inverse_rate: f64,
}

/// Which token-selection problem was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSelectionError {
    /// At least one selector is empty.
    Unselected,
    /// Both selectors hold the same token.
    Identical,
}

/// Why a request cannot be submitted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteRejection {
    /// Missing or duplicate token choice.
    #[error("{}", selection_message(.0))]
    TokenSelection(TokenSelectionError),

    /// Parsed amount is zero or negative.
    #[error("amount must be greater than 0")]
    AmountRange,

    /// A selected token has no catalog price.
    #[error("missing price for selected token")]
    PriceUnavailable,

    /// Amount exceeds the source balance. The quote is still computed.
    #[error("insufficient balance: available {} {}", shown_amount(.available), .symbol)]
    InsufficientBalance {
        /// Balance of the source token at evaluation time.
        available: f64,
        /// Source token.
        symbol: Symbol,
        /// Exchange that would have applied.
        quote: Quote,
    },

    /// Prices produce a zero, negative or non-finite output.
    #[error("quote output is not positive")]
    DegenerateOutput {
        /// The unusable quote.
        quote: Quote,
    },
}

fn shown_amount(value: &f64) -> String {
    format_amount(*value)
}

fn selection_message(kind: &TokenSelectionError) -> &'static str {
    match kind {
        TokenSelectionError::Unselected => "select both tokens",
        TokenSelectionError::Identical => "tokens must be different",
    }
}

impl QuoteRejection {
    /// Message for the user, or `None` when the rejection is shown only by
    /// disabling submission.
    pub fn user_message(&self) -> Option<String> {
        match self {
            QuoteRejection::DegenerateOutput { .. } => None,
            other => Some(other.to_string()),
        }
    }

    /// Quote computed before the rejection, when evaluation got that far.
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            QuoteRejection::InsufficientBalance { quote, .. }
            | QuoteRejection::DegenerateOutput { quote } => Some(quote),
            _ => None,
        }
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteResult {
    /// Nothing usable typed yet; no message, nothing to show.
    Empty,
    /// Fails validation.
    Invalid(QuoteRejection),
    /// Ready to submit.
    Valid(Quote),
}

impl QuoteResult {
    /// `true` only for `Valid`; gates the submit action.
    pub fn is_submittable(&self) -> bool {
        matches!(self, QuoteResult::Valid(_))
    }

    /// Quote to display, including the one carried by a balance rejection.
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            QuoteResult::Valid(quote) => Some(quote),
            QuoteResult::Invalid(rejection) => rejection.quote(),
            QuoteResult::Empty => None,
        }
    }

    /// User-facing message, if the result calls for one.
    pub fn message(&self) -> Option<String> {
        match self {
            QuoteResult::Invalid(rejection) => rejection.user_message(),
            _ => None,
        }
    }
}

/// Parses typed amount text: `,` separators removed, whitespace trimmed.
/// Blank or non-finite input is `None`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Everything a rule may look at, derived once per evaluation.
#[derive(Debug, Clone)]
pub struct QuoteFacts<'a> {
    /// Selected source token.
    pub from: Option<&'a Symbol>,
    /// Selected destination token.
    pub to: Option<&'a Symbol>,
    /// Parsed amount.
    pub amount: Option<f64>,
    /// Balance of the source token (zero when unselected).
    pub available: f64,
    /// Exchange, present when both tokens are priced and the amount parsed.
    pub quote: Option<Quote>,
}

impl<'a> QuoteFacts<'a> {
    /// Gathers facts for `request`.
    pub fn gather(
        request: &'a QuoteRequest,
        catalog: &PriceCatalog,
        ledger: &BalanceLedger,
    ) -> Self {
        let from = request.from.as_ref();
        let to = request.to.as_ref();
        let amount = parse_amount(&request.amount_text);
        let available = from.map(|s| ledger.balance(s)).unwrap_or(0.0);

        let quote = match (from, to, amount) {
            (Some(from), Some(to), Some(amount)) => {
                match (catalog.price(from), catalog.price(to)) {
                    (Some(price_from), Some(price_to)) => Some(Quote {
                        from: from.clone(),
                        to: to.clone(),
                        input_amount: amount,
                        output_amount: (amount * price_from) / price_to,
                        rate: price_from / price_to,
                        inverse_rate: price_to / price_from,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        Self {
            from,
            to,
            amount,
            available,
            quote,
        }
    }
}

/// A named step of the validation order.
#[derive(Clone, Copy)]
pub struct ValidationRule {
    /// Stable rule name, used in logs.
    pub name: &'static str,
    /// Returns the deciding result, or `None` to pass to the next rule.
    pub check: fn(&QuoteFacts<'_>) -> Option<QuoteResult>,
}

/// Validation rules in precedence order.
pub const VALIDATION_RULES: [ValidationRule; 7] = [
    ValidationRule { name: "selection", check: check_selection },
    ValidationRule { name: "distinct", check: check_distinct },
    ValidationRule { name: "amount_given", check: check_amount_given },
    ValidationRule { name: "amount_range", check: check_amount_range },
    ValidationRule { name: "priced", check: check_priced },
    ValidationRule { name: "funded", check: check_funded },
    ValidationRule { name: "output", check: check_output },
];

fn check_selection(facts: &QuoteFacts<'_>) -> Option<QuoteResult> {
    (facts.from.is_none() || facts.to.is_none()).then_some(QuoteResult::Invalid(
        QuoteRejection::TokenSelection(TokenSelectionError::Unselected),
    ))
}

fn check_distinct(facts: &QuoteFacts<'_>) -> Option<QuoteResult> {
    (facts.from == facts.to).then_some(QuoteResult::Invalid(QuoteRejection::TokenSelection(
        TokenSelectionError::Identical,
    )))
}

fn check_amount_given(facts: &QuoteFacts<'_>) -> Option<QuoteResult> {
    facts.amount.is_none().then_some(QuoteResult::Empty)
}

fn check_amount_range(facts: &QuoteFacts<'_>) -> Option<QuoteResult> {
    match facts.amount {
        Some(amount) if amount <= 0.0 => Some(QuoteResult::Invalid(QuoteRejection::AmountRange)),
        _ => None,
    }
}

fn check_priced(facts: &QuoteFacts<'_>) -> Option<QuoteResult> {
    facts
        .quote
        .is_none()
        .then_some(QuoteResult::Invalid(QuoteRejection::PriceUnavailable))
}

fn check_funded(facts: &QuoteFacts<'_>) -> Option<QuoteResult> {
    let (quote, from, amount) = (facts.quote.as_ref()?, facts.from?, facts.amount?);
    (amount > facts.available).then(|| {
        QuoteResult::Invalid(QuoteRejection::InsufficientBalance {
            available: facts.available,
            symbol: from.clone(),
            quote: quote.clone(),
        })
    })
}

fn check_output(facts: &QuoteFacts<'_>) -> Option<QuoteResult> {
    let quote = facts.quote.as_ref()?;
    let usable = quote.output_amount.is_finite() && quote.output_amount > 0.0;
    (!usable).then(|| {
        QuoteResult::Invalid(QuoteRejection::DegenerateOutput {
            quote: quote.clone(),
        })
    })
}

/// Evaluates `request` against `catalog` and `ledger`. Pure: identical inputs
/// always produce identical results.
pub fn evaluate(
    request: &QuoteRequest,
    catalog: &PriceCatalog,
    ledger: &BalanceLedger,
) -> QuoteResult {
    let facts = QuoteFacts::gather(request, catalog, ledger);
    for rule in &VALIDATION_RULES {
        if let Some(result) = (rule.check)(&facts) {
            trace!("Quote decided by rule `{}`: {:?}", rule.name, result);
            return result;
        }
    }
    match facts.quote {
        Some(quote) => QuoteResult::Valid(quote),
        // Every rule above passed, so a quote exists; keep the type total.
        None => QuoteResult::Invalid(QuoteRejection::PriceUnavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    fn facts<'a>(request: &'a QuoteRequest) -> QuoteFacts<'a> {
        let catalog = PriceCatalog::from_prices([("USDC", 1.0), ("ETH", 3500.0)]);
        let ledger = BalanceLedger::from_balances([(sym("USDC"), 1000.0)]);
        QuoteFacts::gather(request, &catalog, &ledger)
    }

    #[test]
    fn parse_amount_strips_separators_and_whitespace() {
        assert_eq!(parse_amount(" 1,234.5 "), Some(1234.5));
        assert_eq!(parse_amount("-3"), Some(-3.0));
        assert_eq!(parse_amount(".5"), Some(0.5));
        assert_eq!(parse_amount("1e3"), Some(1000.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount(" , "), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn rules_are_in_documented_order() {
        let names: Vec<_> = VALIDATION_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            ["selection", "distinct", "amount_given", "amount_range", "priced", "funded", "output"]
        );
    }

    #[test]
    fn selection_rule_in_isolation() {
        let request = QuoteRequest::new("USDC", "", "5");
        assert_eq!(
            check_selection(&facts(&request)),
            Some(QuoteResult::Invalid(QuoteRejection::TokenSelection(
                TokenSelectionError::Unselected
            )))
        );
        let request = QuoteRequest::new("USDC", "ETH", "5");
        assert_eq!(check_selection(&facts(&request)), None);
    }

    #[test]
    fn distinct_rule_in_isolation() {
        let request = QuoteRequest::new("eth", "ETH", "");
        assert!(matches!(
            check_distinct(&facts(&request)),
            Some(QuoteResult::Invalid(QuoteRejection::TokenSelection(
                TokenSelectionError::Identical
            )))
        ));
    }

    #[test]
    fn amount_rules_in_isolation() {
        let blank = QuoteRequest::new("USDC", "ETH", "  ");
        assert_eq!(check_amount_given(&facts(&blank)), Some(QuoteResult::Empty));

        let zero = QuoteRequest::new("USDC", "ETH", "0");
        assert_eq!(check_amount_given(&facts(&zero)), None);
        assert_eq!(
            check_amount_range(&facts(&zero)),
            Some(QuoteResult::Invalid(QuoteRejection::AmountRange))
        );
    }

    #[test]
    fn priced_rule_in_isolation() {
        let request = QuoteRequest::new("ZIL", "USDC", "10");
        assert_eq!(
            check_priced(&facts(&request)),
            Some(QuoteResult::Invalid(QuoteRejection::PriceUnavailable))
        );
    }

    #[test]
    fn funded_rule_carries_quote() {
        let request = QuoteRequest::new("USDC", "ETH", "2000");
        let Some(QuoteResult::Invalid(rejection)) = check_funded(&facts(&request)) else {
            panic!("expected insufficient balance");
        };
        assert_eq!(
            rejection.user_message().as_deref(),
            Some("insufficient balance: available 1000 USDC")
        );
        let quote = rejection.quote().unwrap();
        assert!((quote.output_amount - 2000.0 / 3500.0).abs() < 1e-12);
    }

    #[test]
    fn output_rule_is_silent() {
        let catalog = PriceCatalog::from_prices([("USDC", 1.0), ("DUST", 0.0)]);
        let ledger = BalanceLedger::from_balances([(sym("DUST"), 10.0)]);
        let request = QuoteRequest::new("DUST", "USDC", "5");
        let result = evaluate(&request, &catalog, &ledger);
        assert!(matches!(
            result,
            QuoteResult::Invalid(QuoteRejection::DegenerateOutput { .. })
        ));
        assert_eq!(result.message(), None);
        assert!(!result.is_submittable());
    }

    #[test]
    fn messages_match_user_strings() {
        assert_eq!(
            QuoteRejection::TokenSelection(TokenSelectionError::Unselected).to_string(),
            "select both tokens"
        );
        assert_eq!(
            QuoteRejection::TokenSelection(TokenSelectionError::Identical).to_string(),
            "tokens must be different"
        );
        assert_eq!(QuoteRejection::AmountRange.to_string(), "amount must be greater than 0");
        assert_eq!(
            QuoteRejection::PriceUnavailable.to_string(),
            "missing price for selected token"
        );
    }
}
