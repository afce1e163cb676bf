use swap_common::session::RefreshOutcome;
use swap_common::{BalanceLedger, PriceCatalog, QuoteResult, SeedPolicy, SwapSession, Symbol};

fn sym(s: &str) -> Symbol {
    Symbol::parse(s).unwrap()
}

#[test]
fn settlement_moves_balances_and_clears_amount() {
    let catalog = PriceCatalog::from_prices([("USDC", 1.0), ("ETH", 3500.0)]);
    let ledger = BalanceLedger::from_balances([(sym("USDC"), 1000.0), (sym("ETH"), 0.5)]);
    let mut session = SwapSession::with_state(catalog, ledger);
    session.set_amount("700");

    let before = session.evaluate();
    let pending = session.prepare_submission().unwrap();
    let receipt = session.settle(pending).unwrap();

    assert_eq!(receipt.spent, 700.0);
    assert_eq!(receipt.received, 700.0 / 3500.0);
    assert_eq!(session.balance_of(&sym("USDC")), 300.0);
    assert_eq!(session.balance_of(&sym("ETH")), 0.5 + 700.0 / 3500.0);
    assert_eq!(session.amount_text(), "");
    assert_eq!(session.evaluate(), QuoteResult::Empty);

    // Same request again is recomputed against the new balances.
    session.set_amount("700");
    let after = session.evaluate();
    assert!(before.is_submittable());
    assert_eq!(
        after.message().as_deref(),
        Some("insufficient balance: available 300 USDC")
    );
}

#[test]
fn spending_whole_balance_leaves_zero() {
    let catalog = PriceCatalog::from_prices([("USDC", 1.0), ("ETH", 3500.0)]);
    let ledger = BalanceLedger::from_balances([(sym("USDC"), 0.3)]);
    let mut session = SwapSession::with_state(catalog, ledger);
    session.set_amount("0.3");
    let pending = session.prepare_submission().unwrap();
    let receipt = session.settle(pending).unwrap();
    assert_eq!(receipt.from_balance, 0.0);
    assert!(!session.evaluate().is_submittable());
}

#[test]
fn feed_to_swap_round_trip() {
    let feed = br#"[
        {"currency": "USDC", "date": "2023-08-29T07:10:40.000Z", "price": 0.989832},
        {"currency": "ETH", "date": "2023-08-29T07:10:52.000Z", "price": 1645.9337373737374},
        {"currency": "ATOM", "date": "2023-08-29T07:10:50.000Z", "price": 7.186657333333334}
    ]"#;
    let mut session = SwapSession::new(SeedPolicy::Checksum);
    let ticket = session.begin_refresh();
    let outcome = session.apply_refresh(ticket, PriceCatalog::from_json_slice(feed));
    assert_eq!(outcome, RefreshOutcome::Applied(3));
    assert_eq!(session.from(), Some(&sym("USDC")));
    assert_eq!(session.to(), Some(&sym("ETH")));

    session.fill_max();
    assert_eq!(session.amount_text(), "18.5");
    let pending = session.prepare_submission().unwrap();
    let receipt = session.settle(pending).unwrap();
    assert_eq!(receipt.from_balance, 0.0);
    assert_eq!(receipt.to_balance, 42.0 + 18.5 * 0.989832 / 1645.9337373737374);
}
