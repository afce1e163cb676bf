//! Command-line arguments for the swap client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use swap_common::config::{DEFAULT_ICON_BASE, DEFAULT_PRICE_URL, SETTLEMENT_DELAY_MS};
use swap_common::SeedPolicy;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// URL of the JSON price feed.
    #[clap(long, default_value = DEFAULT_PRICE_URL)]
    pub price_url: String,

    /// Read prices from a local JSON file instead of the network.
    #[clap(long)]
    pub prices_file: Option<String>,

    /// Base path for token icons.
    #[clap(long, default_value = DEFAULT_ICON_BASE)]
    pub icon_base: String,

    /// Check that icons exist and fall back to a placeholder otherwise.
    #[clap(long)]
    pub probe_icons: bool,

    /// Delay between submit and settlement, in milliseconds.
    #[clap(long, default_value_t = SETTLEMENT_DELAY_MS)]
    pub settle_delay_ms: u64,

    /// Seed simulated balances randomly with this seed instead of the symbol checksum.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Initial source token.
    #[clap(long)]
    pub from: Option<String>,

    /// Initial destination token.
    #[clap(long)]
    pub to: Option<String>,

    /// Initial amount to quote.
    #[clap(long)]
    pub amount: Option<String>,

    /// Print a single quote and exit instead of starting the console.
    #[clap(long)]
    pub once: bool,

    /// With `--once`, print the quote as JSON.
    #[clap(long, requires = "once")]
    pub json: bool,
}

impl Args {
    /// Balance seeding selected by `--seed`.
    pub fn seed_policy(&self) -> SeedPolicy {
        match self.seed {
            Some(seed) => SeedPolicy::Random { seed },
            None => SeedPolicy::Checksum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_feed() {
        let args = Args::parse_from(["swap_client"]);
        assert_eq!(args.price_url, DEFAULT_PRICE_URL);
        assert_eq!(args.settle_delay_ms, SETTLEMENT_DELAY_MS);
        assert_eq!(args.seed_policy(), SeedPolicy::Checksum);
    }

    #[test]
    fn seed_switches_policy() {
        let args = Args::parse_from(["swap_client", "--seed", "9", "--once", "--json"]);
        assert_eq!(args.seed_policy(), SeedPolicy::Random { seed: 9 });
        assert!(args.json);
    }

    #[test]
    fn json_requires_once() {
        assert!(Args::try_parse_from(["swap_client", "--json"]).is_err());
    }
}
