//! Price catalog and feed normalization.
//!
//! The price feed arrives in one of two JSON shapes:
//!
//! - an array of records, each naming its token in `currency` (or `symbol`)
//!   and carrying a `price`; when a token repeats, the last record wins;
//! - an object keyed by token, whose values are either bare prices or objects
//!   with a `price` field.
//!
//! Both collapse into one [`PriceCatalog`]. Symbols are uppercased and any
//! entry whose price does not yield a finite number is dropped, so a lookup
//! miss always means "no price", never zero.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;

use crate::config::{PREFERRED_FROM, PREFERRED_TO};
use crate::result::Result;
use crate::symbol::Symbol;

/// Latest known price per symbol, iterated in lexicographic symbol order.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceCatalog {
    prices: BTreeMap<Symbol, f64>,
    built_at: DateTime<Utc>,
}

impl Default for PriceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceCatalog {
    /// Empty catalog; every lookup misses.
    pub fn new() -> Self {
        Self {
            prices: BTreeMap::new(),
            built_at: Utc::now(),
        }
    }

    /// Builds a catalog from `(symbol, price)` pairs, applying the same
    /// filtering as feed normalization. Later pairs overwrite earlier ones.
    pub fn from_prices<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for (raw, price) in pairs {
            catalog.insert(raw.as_ref(), price);
        }
        catalog
    }

    /// Decodes raw feed bytes and normalizes them.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_feed(&value))
    }

    /// Normalizes either supported feed shape. Any other JSON value yields an
    /// empty catalog.
    pub fn from_feed(feed: &Value) -> Self {
        let mut catalog = Self::new();
        match feed {
            Value::Array(records) => {
                for record in records {
                    let name = record
                        .get("currency")
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .or_else(|| record.get("symbol").and_then(Value::as_str));
                    let (Some(name), Some(price)) = (name, record.get("price").and_then(price_of))
                    else {
                        debug!("Skipping feed record without usable symbol/price: {}", record);
                        continue;
                    };
                    catalog.insert(name, price);
                }
            }
            Value::Object(entries) => {
                for (name, entry) in entries {
                    let price = match entry.get("price") {
                        Some(inner) if !inner.is_null() => price_of(inner),
                        _ => price_of(entry),
                    };
                    match price {
                        Some(price) => catalog.insert(name, price),
                        None => debug!("Skipping feed entry {} without usable price", name),
                    }
                }
            }
            other => debug!("Unsupported price feed shape: {}", other),
        }
        catalog
    }

    fn insert(&mut self, raw: &str, price: f64) {
        if !price.is_finite() {
            return;
        }
        if let Some(symbol) = Symbol::parse(raw) {
            self.prices.insert(symbol, price);
        }
    }

    /// Price for `symbol`, if listed.
    pub fn price(&self, symbol: &Symbol) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    /// Whether `symbol` has a price.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.prices.contains_key(symbol)
    }

    /// Available symbols, sorted lexicographically.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.prices.keys().cloned().collect()
    }

    /// Number of priced symbols.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// `true` when no symbol is priced.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// When this catalog was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Pair selected when the user has not chosen one: `USDC` → `ETH` when
    /// listed, otherwise the first symbol and the first symbol different
    /// from it. A single-symbol catalog pairs the symbol with itself.
    pub fn default_pair(&self) -> Option<(Symbol, Symbol)> {
        let symbols = self.symbols();
        let first = symbols.first()?;

        let from = Symbol::parse(PREFERRED_FROM)
            .filter(|s| self.contains(s))
            .unwrap_or_else(|| first.clone());
        let to = Symbol::parse(PREFERRED_TO)
            .filter(|s| self.contains(s) && *s != from)
            .or_else(|| symbols.iter().find(|s| **s != from).cloned())
            .unwrap_or_else(|| from.clone());
        Some((from, to))
    }
}

/// Reads a price from a JSON number or a numeric string.
fn price_of(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    price.is_finite().then_some(price)
}
