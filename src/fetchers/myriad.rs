//! Market fetcher for a Myriad-compatible markets endpoint
//!
//! The base URL comes from configuration; without one the venue is
//! skipped. The endpoint is expected to serve a JSON array of markets.

use super::{field_decimal, field_f64, field_id, FetchError};
use crate::config::Config;
use crate::matcher::normalize_title;
use crate::types::{NormalizedMarket, Platform};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Fetcher for Myriad binary markets
pub struct MyriadFetcher {
    client: Client,
    api_base: Option<String>,
}

/// Raw market entry from the Myriad API
#[derive(Debug, Deserialize)]
struct MyriadMarket {
    #[serde(default)]
    id: Value,
    #[serde(rename = "type", default)]
    market_type: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    yes_price: Value,
    #[serde(default)]
    no_price: Value,
    #[serde(default)]
    liquidity_usd: Value,
    #[serde(default)]
    url: Option<String>,
}

impl MyriadFetcher {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base: config.myriad_api_base.clone(),
        }
    }

    /// Fetch binary markets, normalized and filtered by liquidity.
    ///
    /// Myriad reports both sides; a venue-reported NO price wins over the
    /// YES complement even when the two do not sum to 1.
    pub async fn fetch_markets(
        &self,
        min_liquidity_usd: Decimal,
    ) -> Result<Vec<NormalizedMarket>, FetchError> {
        let Some(base) = &self.api_base else {
            debug!("myriad API base not configured, skipping venue");
            return Ok(Vec::new());
        };

        let url = format!("{base}/markets");
        debug!("Fetching markets from: {}", url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api { status, body });
        }

        let markets: Vec<MyriadMarket> = response.json().await?;

        let mut out = Vec::new();
        for m in markets {
            if m.market_type.as_deref() != Some("binary") {
                continue;
            }

            let yes = field_f64(&m.yes_price);
            let no = field_f64(&m.no_price).or_else(|| yes.map(|y| 1.0 - y));

            let liquidity = field_decimal(&m.liquidity_usd).unwrap_or_default();
            if liquidity < min_liquidity_usd {
                continue;
            }

            out.push(NormalizedMarket {
                platform: Platform::Myriad,
                event_id: field_id(&m.id).unwrap_or_default(),
                title: normalize_title(m.title.as_deref().unwrap_or_default()),
                yes_price: yes,
                no_price: no,
                liquidity_usd: Some(liquidity),
                url: m.url,
            });
        }

        info!("myriad: {} market(s) after filtering", out.len());
        Ok(out)
    }
}
