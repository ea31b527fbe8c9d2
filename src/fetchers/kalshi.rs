//! Market fetcher for the Kalshi trade API

use super::{field_decimal, field_f64, FetchError};
use crate::config::Config;
use crate::matcher::normalize_title;
use crate::types::{NormalizedMarket, Platform};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

const API_URL: &str = "https://trades-api.kalshi.com/v2";

/// Fetcher for Kalshi binary markets
///
/// Kalshi requires a session login; the client keeps the session cookie.
/// Without configured credentials the venue is skipped, not failed.
pub struct KalshiFetcher {
    client: Client,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketsResponse {
    #[serde(default)]
    markets: Vec<KalshiMarket>,
}

/// Raw market entry from the Kalshi API
#[derive(Debug, Deserialize)]
struct KalshiMarket {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    ticker: Option<String>,
    #[serde(rename = "type", default)]
    market_type: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    event_ticker: Option<String>,
    #[serde(default)]
    yes_bid: Value,
    #[serde(default)]
    no_bid: Value,
    #[serde(default)]
    last_trade_price: Value,
    #[serde(default)]
    volume: Value,
}

impl KalshiFetcher {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            email: config.kalshi_email.clone(),
            password: config.kalshi_password.clone(),
        }
    }

    /// Fetch binary markets, normalized and filtered by liquidity.
    ///
    /// Prices fall back from the bid to the last trade on the YES side and
    /// from the bid to the YES complement on the NO side. A market with no
    /// usable price is still returned; the evaluator skips it per pair.
    pub async fn fetch_markets(
        &self,
        min_liquidity_usd: Decimal,
    ) -> Result<Vec<NormalizedMarket>, FetchError> {
        let (Some(email), Some(password)) = (&self.email, &self.password) else {
            debug!("kalshi credentials not configured, skipping venue");
            return Ok(Vec::new());
        };

        self.log_in(email, password).await?;

        let url = format!("{API_URL}/markets");
        debug!("Fetching markets from: {}", url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api { status, body });
        }

        let markets: MarketsResponse = response.json().await?;

        let mut out = Vec::new();
        for m in markets.markets {
            if m.market_type.as_deref() != Some("binary") {
                continue;
            }

            let title = m
                .title
                .clone()
                .or_else(|| m.event_ticker.clone())
                .unwrap_or_default();
            let yes = field_f64(&m.yes_bid).or_else(|| field_f64(&m.last_trade_price));
            let no = field_f64(&m.no_bid).or_else(|| yes.map(|y| 1.0 - y));

            let liquidity = field_decimal(&m.volume).unwrap_or_default();
            if liquidity < min_liquidity_usd {
                continue;
            }

            let ticker = m.ticker.clone().unwrap_or_default();
            out.push(NormalizedMarket {
                platform: Platform::Kalshi,
                event_id: m.id.or(m.ticker).unwrap_or_default(),
                title: normalize_title(&title),
                yes_price: yes,
                no_price: no,
                liquidity_usd: Some(liquidity),
                url: Some(format!("https://kalshi.com/markets/{ticker}")),
            });
        }

        info!("kalshi: {} market(s) after filtering", out.len());
        Ok(out)
    }

    async fn log_in(&self, email: &str, password: &str) -> Result<(), FetchError> {
        let response = self
            .client
            .post(format!("{API_URL}/log_in"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Login(body));
        }
        Ok(())
    }
}
