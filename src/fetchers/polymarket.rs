//! Market fetcher for the Polymarket CLOB API

use super::{field_decimal, field_f64, field_id, FetchError};
use crate::matcher::normalize_title;
use crate::types::{NormalizedMarket, Platform};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

const BASE_URL: &str = "https://clob.polymarket.com";

/// Fetcher for Polymarket binary markets
pub struct PolymarketFetcher {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct MarketsResponse {
    #[serde(default)]
    data: Vec<ClobMarket>,
}

/// Raw market entry from the CLOB API
#[derive(Debug, Deserialize)]
struct ClobMarket {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    last_price: Value,
    #[serde(default)]
    liquidity: Value,
    #[serde(default)]
    event_id: Option<String>,
}

impl PolymarketFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch active markets, normalized and filtered by liquidity.
    ///
    /// Polymarket only quotes a YES last price; NO is taken as its
    /// complement. Markets without a last price are skipped.
    pub async fn fetch_markets(
        &self,
        min_liquidity_usd: Decimal,
    ) -> Result<Vec<NormalizedMarket>, FetchError> {
        let url = format!("{BASE_URL}/markets?limit=1000&active=true");
        debug!("Fetching markets from: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api { status, body });
        }

        let markets: MarketsResponse = response.json().await?;

        let mut out = Vec::new();
        for m in markets.data {
            let question = m
                .question
                .or(m.title)
                .filter(|q| !q.is_empty())
                .unwrap_or_default();
            let Some(yes) = field_f64(&m.last_price) else {
                continue;
            };

            let liquidity = field_decimal(&m.liquidity).unwrap_or_default();
            if liquidity < min_liquidity_usd {
                continue;
            }

            let url = match m.event_id.as_deref().filter(|e| !e.is_empty()) {
                Some(event_id) => format!("https://polymarket.com/event/{event_id}"),
                None => "https://polymarket.com/".to_string(),
            };

            out.push(NormalizedMarket {
                platform: Platform::Polymarket,
                event_id: field_id(&m.id).unwrap_or_default(),
                title: normalize_title(&question),
                yes_price: Some(yes),
                no_price: Some(1.0 - yes),
                liquidity_usd: Some(liquidity),
                url: Some(url),
            });
        }

        info!("polymarket: {} market(s) after filtering", out.len());
        Ok(out)
    }
}

impl Default for PolymarketFetcher {
    fn default() -> Self {
        Self::new()
    }
}
