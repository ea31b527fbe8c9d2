//! Configuration management for the arbitrage watcher

use crate::types::Platform;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Watcher configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum liquidity for markets to consider (fetcher pre-filter)
    pub min_liquidity_usd: Decimal,

    /// Token-set similarity threshold for matching titles (0-100)
    pub title_similarity_threshold: u8,

    /// Minimum fee-adjusted edge, in percent, to report
    pub min_edge_percent: f64,

    /// Poll interval for continuous mode, in seconds
    pub poll_seconds: u64,

    /// Titles containing any of these lowercase keywords are skipped
    pub exclude_keywords: Vec<String>,

    /// Per-venue taker fee in percent; missing venues pay 0%
    pub fees_percent: HashMap<Platform, f64>,

    /// Discord webhook URL for opportunity alerts (optional)
    pub discord_webhook_url: Option<String>,

    /// Kalshi credentials (optional; venue is skipped without them)
    pub kalshi_email: Option<String>,
    pub kalshi_password: Option<String>,

    /// Myriad API base URL (optional; venue is skipped without it)
    pub myriad_api_base: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let min_liquidity_usd = env::var("MIN_LIQUIDITY_USD")
            .ok()
            .and_then(|v| Decimal::from_str(&v).ok())
            .unwrap_or_default();

        let title_similarity_threshold = env::var("TITLE_SIMILARITY_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(88)
            .min(100);

        let min_edge_percent = env::var("MIN_EDGE_PERCENT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.2);

        let poll_seconds = env::var("POLL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let exclude_keywords = env::var("EXCLUDE_KEYWORDS")
            .map(|v| parse_keywords(&v))
            .unwrap_or_default();

        let fees_percent = match env::var("FEES_PERCENT") {
            Ok(raw) => parse_fees(&raw).context("invalid FEES_PERCENT")?,
            Err(_) => HashMap::new(),
        };

        let discord_webhook_url = env::var("DISCORD_WEBHOOK_URL").ok().filter(|s| !s.is_empty());
        let kalshi_email = env::var("KALSHI_EMAIL").ok().filter(|s| !s.is_empty());
        let kalshi_password = env::var("KALSHI_PASSWORD").ok().filter(|s| !s.is_empty());
        let myriad_api_base = env::var("MYRIAD_API_BASE")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            min_liquidity_usd,
            title_similarity_threshold,
            min_edge_percent,
            poll_seconds,
            exclude_keywords,
            fees_percent,
            discord_webhook_url,
            kalshi_email,
            kalshi_password,
            myriad_api_base,
        })
    }
}

/// Parse `venue=pct` pairs, e.g. `"kalshi=7,polymarket=2"`.
///
/// An unknown venue name or unparseable percentage is a configuration
/// error, the one class of error allowed to be fatal.
fn parse_fees(raw: &str) -> Result<HashMap<Platform, f64>> {
    let mut fees = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (venue, pct) = entry
            .split_once('=')
            .with_context(|| format!("expected venue=pct, got {entry:?}"))?;
        let platform: Platform = venue
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        let pct: f64 = pct
            .trim()
            .parse()
            .with_context(|| format!("bad fee percentage for {venue}: {pct:?}"))?;
        fees.insert(platform, pct);
    }
    Ok(fees)
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fees() {
        let fees = parse_fees("kalshi=7, polymarket=2").unwrap();
        assert_eq!(fees.get(&Platform::Kalshi), Some(&7.0));
        assert_eq!(fees.get(&Platform::Polymarket), Some(&2.0));
        assert_eq!(fees.get(&Platform::Myriad), None);
    }

    #[test]
    fn test_parse_fees_empty() {
        assert!(parse_fees("").unwrap().is_empty());
        assert!(parse_fees(" , ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_fees_rejects_unknown_venue() {
        assert!(parse_fees("predictit=5").is_err());
    }

    #[test]
    fn test_parse_fees_rejects_malformed_entry() {
        assert!(parse_fees("kalshi").is_err());
        assert!(parse_fees("kalshi=seven").is_err());
    }

    #[test]
    fn test_parse_keywords_lowercases_and_trims() {
        assert_eq!(
            parse_keywords("Sports, NBA ,,crypto"),
            vec!["sports", "nba", "crypto"]
        );
    }
}
