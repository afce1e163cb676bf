//! Swap session: the one owner of catalog, ledger and form state.
//!
//! Every user control maps to a method here. The session never evaluates on
//! its own; callers ask for [`SwapSession::evaluate`] after each edit and
//! render whatever comes back.
//!
//! Refreshes are two-phase so a slow fetch cannot clobber newer state:
//! [`SwapSession::begin_refresh`] hands out a [`RefreshTicket`] stamped with a
//! monotonically increasing generation, and [`SwapSession::apply_refresh`]
//! ignores any ticket that is no longer the latest.
//!
//! Submissions are two-phase as well. [`SwapSession::prepare_submission`]
//! validates and parks a [`PendingSwap`]; [`SwapSession::settle`] applies it
//! after whatever delay the caller chooses. While a swap is pending, further
//! submissions are refused.
use log::{debug, info, warn};
use serde::Serialize;

use crate::catalog::PriceCatalog;
use crate::error::SwapError;
use crate::ledger::{BalanceLedger, SeedPolicy};
use crate::quote::{self, Quote, QuoteRequest, QuoteResult};
use crate::result::Result;
use crate::symbol::Symbol;

/// Proof that a refresh was requested, stamped with its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    /// Generation this ticket was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a refresh result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Catalog replaced; carries the number of symbols now available.
    Applied(usize),
    /// A newer refresh was requested since; result dropped.
    Stale,
    /// Fetch failed; the previous catalog stays in place.
    Failed(String),
}

/// A validated swap waiting for settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSwap {
    id: u64,
    quote: Quote,
}

impl PendingSwap {
    /// Submission number within this session.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Quote that will be settled.
    pub fn quote(&self) -> &Quote {
        &self.quote
    }
}

/// Receipt for a settled swap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    /// Spent token.
    pub from: Symbol,
    /// Received token.
    pub to: Symbol,
    /// Amount debited from `from`.
    pub spent: f64,
    /// Amount credited to `to`.
    pub received: f64,
    /// Balance of `from` after settlement.
    pub from_balance: f64,
    /// Balance of `to` after settlement.
    pub to_balance: f64,
}

/// Form state plus the catalog and ledger it is evaluated against.
#[derive(Debug, Clone, Default)]
pub struct SwapSession {
    catalog: PriceCatalog,
    ledger: BalanceLedger,
    seed_policy: SeedPolicy,
    from: Option<Symbol>,
    to: Option<Symbol>,
    amount_text: String,
    generation: u64,
    next_submission: u64,
    pending: Option<PendingSwap>,
}

impl SwapSession {
    /// Empty session: no prices, no balances, nothing selected.
    pub fn new(seed_policy: SeedPolicy) -> Self {
        Self {
            seed_policy,
            ..Self::default()
        }
    }

    /// Session over an existing catalog and ledger. The default pair is
    /// selected; the ledger is used as given.
    pub fn with_state(catalog: PriceCatalog, ledger: BalanceLedger) -> Self {
        let mut session = Self {
            catalog,
            ledger,
            ..Self::default()
        };
        if let Some((from, to)) = session.catalog.default_pair() {
            session.from = Some(from);
            session.to = Some(to);
        }
        session
    }

    /// Current request built from the form fields.
    pub fn request(&self) -> QuoteRequest {
        QuoteRequest {
            from: self.from.clone(),
            to: self.to.clone(),
            amount_text: self.amount_text.clone(),
        }
    }

    /// Evaluates the current request. Never cached.
    pub fn evaluate(&self) -> QuoteResult {
        quote::evaluate(&self.request(), &self.catalog, &self.ledger)
    }

    /// Catalog currently in use.
    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    /// Ledger currently in use.
    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    /// Selectable symbols, sorted.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.catalog.symbols()
    }

    /// Selected source token.
    pub fn from(&self) -> Option<&Symbol> {
        self.from.as_ref()
    }

    /// Selected destination token.
    pub fn to(&self) -> Option<&Symbol> {
        self.to.as_ref()
    }

    /// Amount text as typed.
    pub fn amount_text(&self) -> &str {
        &self.amount_text
    }

    /// Balance of `symbol`; zero when unknown.
    pub fn balance_of(&self, symbol: &Symbol) -> f64 {
        self.ledger.balance(symbol)
    }

    /// `true` while a prepared swap waits for settlement.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replaces the amount text.
    pub fn set_amount(&mut self, text: impl Into<String>) {
        self.amount_text = text.into();
    }

    /// Selects the source token; blank text unselects.
    pub fn select_from(&mut self, raw: &str) -> Result<()> {
        self.from = self.resolve(raw)?;
        Ok(())
    }

    /// Selects the destination token; blank text unselects.
    pub fn select_to(&mut self, raw: &str) -> Result<()> {
        self.to = self.resolve(raw)?;
        Ok(())
    }

    fn resolve(&self, raw: &str) -> Result<Option<Symbol>> {
        match Symbol::parse(raw) {
            None => Ok(None),
            Some(symbol) if self.catalog.contains(&symbol) => Ok(Some(symbol)),
            Some(symbol) => Err(SwapError::UnknownSymbol(symbol.to_string())),
        }
    }

    /// Swaps source and destination selections.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// Fills the amount with the whole source balance. Returns the new text.
    pub fn fill_max(&mut self) -> &str {
        let balance = self.from.as_ref().map(|s| self.ledger.balance(s)).unwrap_or(0.0);
        self.amount_text = balance.to_string();
        &self.amount_text
    }

    /// Issues a ticket for a new refresh, superseding all earlier ones.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        debug!("Refresh generation {} issued", self.generation);
        RefreshTicket {
            generation: self.generation,
        }
    }

    /// Applies a fetch result if `ticket` is still the latest.
    ///
    /// On success the catalog is replaced, new symbols get seeded balances,
    /// and the selection is kept where its symbols survive; otherwise the
    /// default pair is selected. On failure nothing changes.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        fetched: Result<PriceCatalog>,
    ) -> RefreshOutcome {
        if ticket.generation != self.generation {
            warn!(
                "Dropping stale refresh (generation {}, latest {})",
                ticket.generation, self.generation
            );
            return RefreshOutcome::Stale;
        }

        let catalog = match fetched {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Price refresh failed, keeping {} cached prices: {}", self.catalog.len(), e);
                return RefreshOutcome::Failed(e.to_string());
            }
        };

        let symbols = catalog.symbols();
        self.ledger.seed_missing(&symbols, self.seed_policy);
        self.catalog = catalog;

        let keep = |s: &Option<Symbol>| s.as_ref().is_some_and(|s| self.catalog.contains(s));
        if !(keep(&self.from) && keep(&self.to)) {
            match self.catalog.default_pair() {
                Some((from, to)) => {
                    self.from = Some(from);
                    self.to = Some(to);
                }
                None => {
                    self.from = None;
                    self.to = None;
                }
            }
        }

        info!("Price catalog refreshed: {} symbols", symbols.len());
        RefreshOutcome::Applied(symbols.len())
    }

    /// Validates the current request and parks it for settlement.
    pub fn prepare_submission(&mut self) -> Result<PendingSwap> {
        if self.pending.is_some() {
            return Err(SwapError::SubmissionPending);
        }
        let quote = match self.evaluate() {
            QuoteResult::Valid(quote) => quote,
            QuoteResult::Empty => {
                return Err(SwapError::NotSubmittable("enter an amount".to_string()));
            }
            QuoteResult::Invalid(rejection) => {
                return Err(SwapError::NotSubmittable(rejection.to_string()));
            }
        };

        self.next_submission += 1;
        let pending = PendingSwap {
            id: self.next_submission,
            quote,
        };
        debug!("Swap #{} pending: {:?}", pending.id, pending.quote);
        self.pending = Some(pending.clone());
        Ok(pending)
    }

    /// Applies a pending swap to the ledger and clears the amount.
    pub fn settle(&mut self, pending: PendingSwap) -> Result<Settlement> {
        match &self.pending {
            Some(current) if current.id == pending.id => {}
            _ => return Err(SwapError::UnknownSubmission(pending.id)),
        }
        self.pending = None;

        let Quote {
            from,
            to,
            input_amount,
            output_amount,
            ..
        } = pending.quote;
        let from_balance = self.ledger.debit_clamped(&from, input_amount);
        let to_balance = self.ledger.credit(&to, output_amount);
        self.amount_text.clear();

        info!("Swapped {} {} -> {} {}", input_amount, from, output_amount, to);
        Ok(Settlement {
            from,
            to,
            spent: input_amount,
            received: output_amount,
            from_balance,
            to_balance,
        })
    }
}
