use proptest::prelude::*;
use swap_common::quote::TokenSelectionError;
use swap_common::{
    evaluate, BalanceLedger, PriceCatalog, QuoteRejection, QuoteRequest, QuoteResult, Symbol,
};

fn sym(s: &str) -> Symbol {
    Symbol::parse(s).unwrap()
}

fn market() -> (PriceCatalog, BalanceLedger) {
    let catalog = PriceCatalog::from_prices([("USDC", 1.0), ("ETH", 3500.0)]);
    let ledger = BalanceLedger::from_balances([(sym("USDC"), 1000.0)]);
    (catalog, ledger)
}

fn unselected() -> QuoteResult {
    QuoteResult::Invalid(QuoteRejection::TokenSelection(TokenSelectionError::Unselected))
}

#[test]
fn usdc_to_eth_within_balance_is_valid() {
    let (catalog, ledger) = market();
    let result = evaluate(&QuoteRequest::new("USDC", "ETH", "500"), &catalog, &ledger);
    let QuoteResult::Valid(quote) = result else {
        panic!("expected a valid quote, got {:?}", result);
    };
    assert!((quote.output_amount - 0.142857142857).abs() < 1e-9);
    assert!((quote.rate - 0.000285714285714).abs() < 1e-12);
    assert_eq!(quote.inverse_rate, 3500.0);
}

#[test]
fn usdc_to_eth_above_balance_names_available_amount() {
    let (catalog, ledger) = market();
    let result = evaluate(&QuoteRequest::new("USDC", "ETH", "2000"), &catalog, &ledger);
    assert_eq!(
        result.message().as_deref(),
        Some("insufficient balance: available 1000 USDC")
    );
    assert!(!result.is_submittable());
    assert!(result.quote().is_some());
}

#[test]
fn unpriced_token_is_reported() {
    let (catalog, ledger) = market();
    let result = evaluate(&QuoteRequest::new("ZIL", "USDC", "10"), &catalog, &ledger);
    assert_eq!(result, QuoteResult::Invalid(QuoteRejection::PriceUnavailable));
    assert_eq!(result.message().as_deref(), Some("missing price for selected token"));
}

#[test]
fn token_checks_outrank_empty_amount() {
    let (catalog, ledger) = market();
    let same = evaluate(&QuoteRequest::new("ETH", "ETH", ""), &catalog, &ledger);
    assert_eq!(same.message().as_deref(), Some("tokens must be different"));

    let none = evaluate(&QuoteRequest::new("", "ETH", ""), &catalog, &ledger);
    assert_eq!(none, unselected());

    let blank = evaluate(&QuoteRequest::new("USDC", "ETH", ""), &catalog, &ledger);
    assert_eq!(blank, QuoteResult::Empty);
    assert_eq!(blank.message(), None);
}

#[test]
fn thousands_separators_are_ignored() {
    let (catalog, _) = market();
    let ledger = BalanceLedger::from_balances([(sym("USDC"), 5000.0)]);
    let result = evaluate(&QuoteRequest::new("USDC", "ETH", " 3,500 "), &catalog, &ledger);
    assert_eq!(result.quote().map(|q| q.output_amount), Some(1.0));
}

proptest! {
    #[test]
    fn unselected_token_always_reported(amount in ".*", pick in 0usize..3) {
        let (catalog, ledger) = market();
        let (from, to) = match pick {
            0 => ("", "ETH"),
            1 => ("USDC", ""),
            _ => ("", ""),
        };
        let result = evaluate(&QuoteRequest::new(from, to, amount), &catalog, &ledger);
        prop_assert_eq!(result, unselected());
    }

    #[test]
    fn identical_tokens_always_reported(amount in ".*") {
        let (catalog, ledger) = market();
        let result = evaluate(&QuoteRequest::new("ETH", "eth", amount), &catalog, &ledger);
        prop_assert_eq!(
            result,
            QuoteResult::Invalid(QuoteRejection::TokenSelection(TokenSelectionError::Identical))
        );
    }

    #[test]
    fn unparsable_amount_is_empty(amount in "[a-zA-Z ]*") {
        let (catalog, ledger) = market();
        let result = evaluate(&QuoteRequest::new("USDC", "ETH", amount), &catalog, &ledger);
        prop_assert_eq!(result, QuoteResult::Empty);
    }

    #[test]
    fn non_positive_amount_is_out_of_range(amount in -1.0e9f64..=0.0) {
        let (catalog, ledger) = market();
        let result = evaluate(&QuoteRequest::new("USDC", "ETH", amount.to_string()), &catalog, &ledger);
        prop_assert_eq!(result, QuoteResult::Invalid(QuoteRejection::AmountRange));
    }

    #[test]
    fn funded_quotes_follow_prices(
        p_from in 1.0e-6f64..1.0e6,
        p_to in 1.0e-6f64..1.0e6,
        amount in 1.0e-6f64..1.0e6,
        headroom in 0.0f64..1.0e6,
    ) {
        let catalog = PriceCatalog::from_prices([("AAA", p_from), ("BBB", p_to)]);
        let ledger = BalanceLedger::from_balances([(sym("AAA"), amount + headroom)]);
        let request = QuoteRequest::new("AAA", "BBB", amount.to_string());
        let result = evaluate(&request, &catalog, &ledger);
        let QuoteResult::Valid(quote) = &result else {
            return Err(TestCaseError::fail(format!("not valid: {:?}", result)));
        };
        let expected = amount * p_from / p_to;
        prop_assert!((quote.output_amount - expected).abs() <= expected.abs() * 1e-12);
        prop_assert_eq!(quote.rate, p_from / p_to);
        prop_assert_eq!(quote.inverse_rate, p_to / p_from);
        prop_assert!((quote.rate * quote.inverse_rate - 1.0).abs() < 1e-9);
        prop_assert_eq!(evaluate(&request, &catalog, &ledger), result);
    }

    #[test]
    fn overdrawn_quotes_name_balance(balance in 0.0f64..1.0e6, excess in 1.0e-3f64..1.0e6) {
        let catalog = PriceCatalog::from_prices([("AAA", 2.0), ("BBB", 3.0)]);
        let ledger = BalanceLedger::from_balances([(sym("AAA"), balance)]);
        let amount = balance + excess;
        let result = evaluate(&QuoteRequest::new("AAA", "BBB", amount.to_string()), &catalog, &ledger);
        let is_insufficient = matches!(
            &result,
            QuoteResult::Invalid(QuoteRejection::InsufficientBalance { available, .. }) if *available == balance
        );
        prop_assert!(is_insufficient, "unexpected {:?}", result);
    }
}
