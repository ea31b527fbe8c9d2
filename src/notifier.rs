//! Opportunity formatting and alert delivery
//!
//! Alerts go to a Discord webhook when one is configured, otherwise to the
//! console. Delivery failures are logged and swallowed; they never abort a
//! cycle or alter its "no opportunities found" outcome.

use crate::types::ArbitrageOpportunity;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info};

/// Render one opportunity as a human-readable multi-line alert.
///
/// Pure. Prices print at 3 decimal places, the edge at 2; source links are
/// appended newline-joined when present.
pub fn format_opportunity(opp: &ArbitrageOpportunity) -> String {
    let mut message = format!(
        "Arbitrage found\n\
         Event: {}\n\
         Buy YES on: {} @ {:.3}\n\
         Buy NO  on: {} @ {:.3}\n\
         Expected edge: {:.2}% (after configured fees)",
        opp.title, opp.buy_yes_on, opp.yes_price, opp.buy_no_on, opp.no_price, opp.edge_percent
    );
    if !opp.urls.is_empty() {
        message.push_str("\nLinks:\n");
        message.push_str(&opp.urls.join("\n"));
    }
    message
}

/// Alert sink for detected opportunities
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    webhook_url: Option<String>,
}

impl Notifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    /// Deliver one alert. Falls back to the console when no webhook is
    /// configured or delivery fails.
    pub async fn send(&self, message: &str) {
        let Some(url) = &self.webhook_url else {
            println!("{message}\n");
            return;
        };

        let payload = json!({ "content": message });
        match self.client.post(url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!("alert delivered");
                } else {
                    error!("webhook returned {}", response.status());
                    println!("[SEND FAILED]\n{message}\n");
                }
            }
            Err(e) => {
                error!("failed to send webhook: {}", e);
                println!("[SEND FAILED]\n{message}\n");
            }
        }
    }

    /// Deliver a batch of alerts with a small delay between them to stay
    /// under webhook rate limits.
    pub async fn send_all(&self, opportunities: &[ArbitrageOpportunity]) {
        for opp in opportunities {
            self.send(&format_opportunity(opp)).await;
            if self.webhook_url.is_some() {
                tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            }
        }
    }
}
