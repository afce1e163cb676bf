//! Fetching prices off the control thread.
//!
//! A `FeedWorker` owns a [`PriceSource`] on a background thread. The control
//! loop sends it a `RefreshTicket`; the worker fetches and answers with a
//! `FeedEvent` carrying the same ticket, so the session can tell whether the
//! answer is still wanted. The worker never touches session state.
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info};
use reqwest::blocking::Client;
use reqwest::header::CACHE_CONTROL;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use swap_common::config::FETCH_TIMEOUT_SECS;
use swap_common::icon::{icon_url, IconSource};
use swap_common::session::RefreshTicket;
use swap_common::{PriceCatalog, Result, SwapError, Symbol};

/// Something that can produce a fresh price catalog.
pub trait PriceSource: Send {
    /// Fetches and normalizes the current prices.
    fn fetch(&self) -> Result<PriceCatalog>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| SwapError::Feed(e.to_string()))
}

/// Prices from an HTTP endpoint, always bypassing caches.
pub struct HttpPriceSource {
    url: String,
    client: Client,
}

impl HttpPriceSource {
    /// Creates a source for `url`.
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            url: url.to_string(),
            client: http_client()?,
        })
    }
}

impl PriceSource for HttpPriceSource {
    fn fetch(&self) -> Result<PriceCatalog> {
        let bytes = self
            .client
            .get(&self.url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|e| SwapError::Feed(format!("GET {}: {}", self.url, e)))?;
        PriceCatalog::from_json_slice(&bytes)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Prices from a JSON file on disk.
pub struct FilePriceSource {
    path: PathBuf,
}

impl FilePriceSource {
    /// Creates a source for `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PriceSource for FilePriceSource {
    fn fetch(&self) -> Result<PriceCatalog> {
        let bytes = fs::read(&self.path)?;
        PriceCatalog::from_json_slice(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Answer to one refresh request.
pub enum FeedEvent {
    /// Fetch finished, successfully or not.
    Fetched {
        /// Ticket the fetch was requested with.
        ticket: RefreshTicket,
        /// Normalized catalog or the failure.
        result: Result<PriceCatalog>,
    },
}

/// Channel ends for talking to the worker thread.
pub struct FeedWorker {
    requests: Sender<RefreshTicket>,
    events: Receiver<FeedEvent>,
}

impl FeedWorker {
    /// Spawns the worker thread around `source`.
    ///
    /// The thread exits once the request side is dropped or nobody listens
    /// for events any more.
    pub fn start(source: Box<dyn PriceSource>) -> Self {
        let (request_tx, request_rx) = unbounded::<RefreshTicket>();
        let (event_tx, event_rx) = unbounded::<FeedEvent>();

        thread::spawn(move || {
            info!("Price feed worker started for {}", source.describe());
            for ticket in request_rx {
                debug!("Fetching prices for generation {}", ticket.generation());
                let result = source.fetch();
                if let Err(e) = &result {
                    error!("Price fetch from {} failed: {}", source.describe(), e);
                }
                if event_tx.send(FeedEvent::Fetched { ticket, result }).is_err() {
                    break;
                }
            }
            debug!("Price feed worker stopping");
        });

        Self {
            requests: request_tx,
            events: event_rx,
        }
    }

    /// Queues a fetch for `ticket`.
    pub fn request(&self, ticket: RefreshTicket) -> Result<()> {
        self.requests
            .send(ticket)
            .map_err(|e| SwapError::ChannelSend(e.to_string()))
    }

    /// Receiver side, for use in `select!`.
    pub fn events(&self) -> &Receiver<FeedEvent> {
        &self.events
    }
}

/// Best-effort icon availability, checked off the control thread.
///
/// `resolve` only reads a per-symbol cache. A symbol seen for the first time is
/// queued for a `HEAD` check on a background thread and shown with its remote
/// URL until the check says otherwise.
pub struct IconProbe {
    base: String,
    checks: Option<Sender<Symbol>>,
    known: Arc<Mutex<HashMap<Symbol, IconSource>>>,
}

fn lock_icons(
    known: &Mutex<HashMap<Symbol, IconSource>>,
) -> MutexGuard<'_, HashMap<Symbol, IconSource>> {
    known.lock().unwrap_or_else(PoisonError::into_inner)
}

fn spawn_icon_checker(
    client: Client,
    base: String,
    known: Arc<Mutex<HashMap<Symbol, IconSource>>>,
) -> Sender<Symbol> {
    let (check_tx, check_rx) = unbounded::<Symbol>();
    thread::spawn(move || {
        for symbol in check_rx {
            let url = icon_url(&base, &symbol);
            let icon = match client.head(&url).send().and_then(|r| r.error_for_status()) {
                Ok(_) => IconSource::Remote(url),
                Err(e) => {
                    debug!("Icon for {} unavailable: {}", symbol, e);
                    IconSource::Placeholder
                }
            };
            lock_icons(&known).insert(symbol, icon);
        }
        debug!("Icon checker stopping");
    });
    check_tx
}

impl IconProbe {
    /// Probe against `base`; with `enabled == false` every icon is assumed
    /// present and no request is made.
    pub fn new(base: &str, enabled: bool) -> Self {
        let known = Arc::new(Mutex::new(HashMap::new()));
        let checks = if enabled {
            http_client()
                .map_err(|e| debug!("Icon probing disabled: {}", e))
                .ok()
                .map(|client| spawn_icon_checker(client, base.to_string(), Arc::clone(&known)))
        } else {
            None
        };
        Self {
            base: base.to_string(),
            checks,
            known,
        }
    }

    /// Where to load the icon for `symbol` from. Never waits on the network.
    pub fn resolve(&self, symbol: &Symbol) -> IconSource {
        let url = icon_url(&self.base, symbol);
        let Some(checks) = &self.checks else {
            return IconSource::Remote(url);
        };
        let mut known = lock_icons(&self.known);
        if let Some(icon) = known.get(symbol) {
            return icon.clone();
        }
        known.insert(symbol.clone(), IconSource::Remote(url.clone()));
        if checks.send(symbol.clone()).is_err() {
            debug!("Icon checker gone; keeping remote URL for {}", symbol);
        }
        IconSource::Remote(url)
    }
}
