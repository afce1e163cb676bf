//!
//! Quote engine and swap session shared by the swap client.
//!
//! This crate aggregates:
//! - `error` — unified error type `SwapError` used across the workspace.
//! - `result` — handy `Result<T, SwapError>` alias.
//! - `symbol` — canonical token symbols.
//! - `catalog` — price catalog and feed normalization.
//! - `ledger` — simulated balances and their seeding.
//! - `quote` — the pure quote evaluation and its ordered validation rules.
//! - `session` — form state, refresh generations and simulated settlement.
//! - `format` — display rounding for amounts and rates.
//! - `icon` — token icon locations.
//! - `config` — shared defaults.
#![warn(missing_docs)]
pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod icon;
pub mod ledger;
pub mod quote;
pub mod result;
pub mod session;
pub mod symbol;

pub use catalog::PriceCatalog;
pub use error::SwapError;
pub use ledger::{BalanceLedger, SeedPolicy};
pub use quote::{evaluate, Quote, QuoteRejection, QuoteRequest, QuoteResult};
pub use result::Result;
pub use session::SwapSession;
pub use symbol::Symbol;
