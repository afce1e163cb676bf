//! Token symbols shared between the library and the client.
//!
//! A `Symbol` is the canonical uppercase identifier of a tradable token. Input
//! is accepted case-insensitively and surrounding whitespace is ignored; an
//! empty identifier is never a symbol, it stands for "nothing selected".
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SwapError;

/// Canonical uppercase token identifier.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Canonicalizes `raw`; returns `None` when nothing is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Symbol(trimmed.to_uppercase()))
    }

    /// The canonical uppercase text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::parse(s).ok_or_else(|| SwapError::Format("empty token symbol".to_string()))
    }
}

impl TryFrom<String> for Symbol {
    type Error = SwapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}
