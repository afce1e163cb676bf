//! Simulated wallet balances.
//!
//! Balances are seeded once per symbol and afterwards change only through
//! settlement. A symbol without an entry reads as a zero balance.
use std::collections::BTreeMap;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::symbol::Symbol;

/// How fresh symbols get their starting balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Deterministic checksum of the symbol text, see [`checksum_balance`].
    #[default]
    Checksum,
    /// Uniform draw from a seeded generator; same seed, same balances.
    Random {
        /// Generator seed.
        seed: u64,
    },
}

/// Starting balance derived from the symbol's UTF-16 code units:
/// `round(((sum % 97) + 3) * 12.34) / 10`.
pub fn checksum_balance(symbol: &Symbol) -> f64 {
    let residue = symbol
        .as_str()
        .encode_utf16()
        .fold(0u32, |acc, unit| (acc + u32::from(unit)) % 97);
    let scaled = f64::from(residue + 3) * 12.34;
    scaled.round() / 10.0
}

/// Per-symbol simulated balances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceLedger {
    balances: BTreeMap<Symbol, f64>,
}

impl BalanceLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with explicit balances. Negative or non-finite inputs are
    /// stored as zero.
    pub fn from_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, f64)>,
    {
        let mut ledger = Self::new();
        for (symbol, amount) in balances {
            ledger.set(symbol, amount);
        }
        ledger
    }

    /// Seeds every symbol in `symbols` that has no entry yet; existing
    /// balances are left untouched. Returns how many entries were added.
    pub fn seed_missing<'a, I>(&mut self, symbols: I, policy: SeedPolicy) -> usize
    where
        I: IntoIterator<Item = &'a Symbol>,
    {
        let mut rng = match policy {
            SeedPolicy::Random { seed } => Some(StdRng::seed_from_u64(seed)),
            SeedPolicy::Checksum => None,
        };
        let mut added = 0;
        for symbol in symbols {
            if self.balances.contains_key(symbol) {
                continue;
            }
            let amount = match rng.as_mut() {
                Some(rng) => (rng.random_range(1.0..1250.0_f64) * 10.0).round() / 10.0,
                None => checksum_balance(symbol),
            };
            debug!("Seeded balance {} {}", amount, symbol);
            self.balances.insert(symbol.clone(), amount);
            added += 1;
        }
        added
    }

    /// Balance for `symbol`; zero when absent.
    pub fn balance(&self, symbol: &Symbol) -> f64 {
        self.balances.get(symbol).copied().unwrap_or(0.0)
    }

    /// Overwrites the balance of `symbol`, clamping to a non-negative finite value.
    pub fn set(&mut self, symbol: Symbol, amount: f64) {
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        self.balances.insert(symbol, amount);
    }

    /// Subtracts `amount`, never going below zero. Returns the new balance.
    pub fn debit_clamped(&mut self, symbol: &Symbol, amount: f64) -> f64 {
        let next = (self.balance(symbol) - amount).max(0.0);
        self.balances.insert(symbol.clone(), next);
        next
    }

    /// Adds `amount`. Returns the new balance.
    pub fn credit(&mut self, symbol: &Symbol, amount: f64) -> f64 {
        let next = self.balance(symbol) + amount;
        self.balances.insert(symbol.clone(), next);
        next
    }

    /// All entries in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, f64)> {
        self.balances.iter().map(|(s, b)| (s, *b))
    }
}
