//! Shared defaults used by the library and the client.

/// Price feed queried at startup and on `refresh`.
pub const DEFAULT_PRICE_URL: &str = "https://interview.switcheo.com/prices.json";
/// Base path for token icons; the uppercase symbol and `.svg` are appended.
pub const DEFAULT_ICON_BASE: &str =
    "https://raw.githubusercontent.com/Switcheo/token-icons/main/tokens/";

/// Source symbol selected after a refresh when nothing else is selected.
pub const PREFERRED_FROM: &str = "USDC";
/// Destination symbol selected after a refresh when nothing else is selected.
pub const PREFERRED_TO: &str = "ETH";

/// Decimal places shown for amounts and balances.
pub const AMOUNT_DECIMALS: usize = 6;
/// Decimal places shown for exchange rates.
pub const RATE_DECIMALS: usize = 8;

/// Artificial latency between submit and settlement, in milliseconds.
pub const SETTLEMENT_DELAY_MS: u64 = 1200;
/// Upper bound for a single price feed request, in seconds.
pub const FETCH_TIMEOUT_SECS: u64 = 10;
