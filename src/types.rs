//! Core types for the arbitrage watcher

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A prediction market venue acting as a data source.
///
/// The declaration order is load-bearing: `Ord` derives from it, and the
/// matcher flattens venues in `BTreeMap` iteration order, which makes
/// grouping reproducible across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Polymarket,
    Kalshi,
    Myriad,
}

impl Platform {
    /// Every supported venue, in matching order.
    pub const ALL: [Platform; 3] = [Platform::Polymarket, Platform::Kalshi, Platform::Myriad];
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Polymarket => write!(f, "polymarket"),
            Platform::Kalshi => write!(f, "kalshi"),
            Platform::Myriad => write!(f, "myriad"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "polymarket" => Ok(Platform::Polymarket),
            "kalshi" => Ok(Platform::Kalshi),
            "myriad" => Ok(Platform::Myriad),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// One quote snapshot from one venue for one binary-outcome event.
///
/// Produced by a fetcher, already title-normalized and liquidity-filtered.
/// The core never mutates these; it only reads and groups them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedMarket {
    pub platform: Platform,
    /// Venue-local identifier, opaque, unique only within its venue.
    pub event_id: String,
    /// Canonicalized title. Used for cross-venue matching, never as a key.
    pub title: String,
    /// YES probability in (0,1), if the venue reports one.
    pub yes_price: Option<f64>,
    /// NO probability in (0,1). Defaults to `1 - yes_price` at ingestion
    /// when the venue only reports YES, but a venue-reported NO always wins
    /// and is not required to sum to 1 with YES (bid/ask spread).
    pub no_price: Option<f64>,
    /// Volume/liquidity proxy in USD. Fetcher pre-filter only.
    pub liquidity_usd: Option<Decimal>,
    /// Venue link, carried through for display only.
    pub url: Option<String>,
}

/// Markets from distinct venues believed to describe the same event.
///
/// Built fresh each evaluation cycle and discarded after arbitrage
/// extraction. Always holds at least two members.
#[derive(Debug, Clone)]
pub struct EventGroup {
    pub markets: Vec<NormalizedMarket>,
}

impl EventGroup {
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

/// A detected cross-venue arbitrage, valid for the current cycle only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Canonical title of the anchor market in the matched group.
    pub title: String,
    pub buy_yes_on: Platform,
    pub buy_no_on: Platform,
    pub yes_price: f64,
    pub no_price: f64,
    /// Fee-adjusted edge, already scaled to percent.
    pub edge_percent: f64,
    /// Deduplicated union of the two source URLs, empties dropped.
    pub urls: Vec<String>,
}

impl ArbitrageOpportunity {
    /// Intra-run deduplication key. Not stable across runs.
    pub fn key(&self) -> (String, Platform, Platform) {
        (self.title.clone(), self.buy_yes_on, self.buy_no_on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_roundtrip() {
        for p in Platform::ALL {
            assert_eq!(p.to_string().parse::<Platform>().unwrap(), p);
        }
    }

    #[test]
    fn test_platform_parse_case_insensitive() {
        assert_eq!("Kalshi".parse::<Platform>().unwrap(), Platform::Kalshi);
        assert!("predictit".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_ordering_matches_declaration() {
        let mut shuffled = vec![Platform::Myriad, Platform::Polymarket, Platform::Kalshi];
        shuffled.sort();
        assert_eq!(shuffled, Platform::ALL.to_vec());
    }
}
