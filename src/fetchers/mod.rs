//! Venue fetchers
//!
//! One fetcher per venue, each producing already-normalized,
//! liquidity-filtered `NormalizedMarket` records. A venue that fails to
//! fetch contributes an empty list for the cycle; transport errors never
//! reach the matching/evaluation path.

pub mod kalshi;
pub mod myriad;
pub mod polymarket;

pub use kalshi::KalshiFetcher;
pub use myriad::MyriadFetcher;
pub use polymarket::PolymarketFetcher;

use crate::config::Config;
use crate::types::{NormalizedMarket, Platform};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::error;

/// A failure confined to one venue for one cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("kalshi login failed: {0}")]
    Login(String),
}

/// Fetch from every venue concurrently and key the results by platform.
///
/// The `BTreeMap` iterates in `Platform` declaration order; together with
/// each venue's response order this fixes the matcher's flattening order,
/// so repeated runs on identical snapshots group identically. A failed
/// venue is logged and represented as an empty list, never as an error.
pub async fn gather_all(config: &Config) -> BTreeMap<Platform, Vec<NormalizedMarket>> {
    let min_liquidity = config.min_liquidity_usd;

    // The fetch futures borrow their fetchers, so keep them alive across
    // the join.
    let polymarket_fetcher = PolymarketFetcher::new();
    let kalshi_fetcher = KalshiFetcher::new(config);
    let myriad_fetcher = MyriadFetcher::new(config);

    let (polymarket, kalshi, myriad) = tokio::join!(
        polymarket_fetcher.fetch_markets(min_liquidity),
        kalshi_fetcher.fetch_markets(min_liquidity),
        myriad_fetcher.fetch_markets(min_liquidity),
    );

    let mut by_venue = BTreeMap::new();
    by_venue.insert(Platform::Polymarket, or_empty(Platform::Polymarket, polymarket));
    by_venue.insert(Platform::Kalshi, or_empty(Platform::Kalshi, kalshi));
    by_venue.insert(Platform::Myriad, or_empty(Platform::Myriad, myriad));
    by_venue
}

fn or_empty(
    platform: Platform,
    result: Result<Vec<NormalizedMarket>, FetchError>,
) -> Vec<NormalizedMarket> {
    match result {
        Ok(markets) => markets,
        Err(e) => {
            error!("{} fetch failed: {}", platform, e);
            Vec::new()
        }
    }
}

/// Read a JSON field that venues report as either a number or a string.
pub(crate) fn field_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub(crate) fn field_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

/// Venue ids arrive as strings or numbers; render either as a plain string.
pub(crate) fn field_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_field_f64_accepts_both_shapes() {
        assert_eq!(field_f64(&json!(0.42)), Some(0.42));
        assert_eq!(field_f64(&json!("0.42")), Some(0.42));
        assert_eq!(field_f64(&json!(null)), None);
        assert_eq!(field_f64(&json!("n/a")), None);
    }

    #[test]
    fn test_field_decimal() {
        assert_eq!(field_decimal(&json!("1500.5")), Some(dec!(1500.5)));
        assert_eq!(field_decimal(&json!(1500)), Some(dec!(1500)));
        assert_eq!(field_decimal(&json!([])), None);
    }

    fn bare_config() -> Config {
        Config {
            min_liquidity_usd: Decimal::ZERO,
            title_similarity_threshold: 88,
            min_edge_percent: 0.2,
            poll_seconds: 60,
            exclude_keywords: Vec::new(),
            fees_percent: Default::default(),
            discord_webhook_url: None,
            kalshi_email: None,
            kalshi_password: None,
            myriad_api_base: None,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_venues_join_to_empty() {
        // fetch_markets borrows its fetcher, so the fetchers must outlive
        // the joined futures.
        let config = bare_config();
        let kalshi_fetcher = KalshiFetcher::new(&config);
        let myriad_fetcher = MyriadFetcher::new(&config);

        let (kalshi, myriad) = tokio::join!(
            kalshi_fetcher.fetch_markets(Decimal::ZERO),
            myriad_fetcher.fetch_markets(Decimal::ZERO),
        );
        assert!(kalshi.unwrap().is_empty());
        assert!(myriad.unwrap().is_empty());
    }

    #[test]
    fn test_field_id() {
        assert_eq!(field_id(&json!("abc")), Some("abc".to_string()));
        assert_eq!(field_id(&json!(42)), Some("42".to_string()));
        assert_eq!(field_id(&json!("")), None);
        assert_eq!(field_id(&json!(null)), None);
    }
}
