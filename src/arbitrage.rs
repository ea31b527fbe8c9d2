//! Fee-adjusted arbitrage evaluation over matched event groups
//!
//! The play: buy YES on one venue and NO on another for the same event.
//! If the combined fee-adjusted cost is under $1.00, the $1.00 payout at
//! resolution locks in the difference regardless of outcome.

use crate::types::{ArbitrageOpportunity, EventGroup, Platform};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Fee-adjusted edge for one YES/NO leg pair, as a fraction of the payout.
///
/// Each leg's effective cost is `price / (1 - fee)`; the edge is one minus
/// the combined cost and may be negative. Returns `None` (not an error)
/// when either price sits outside the open interval (0,1) or either fee is
/// 100% or more, which makes the leg economically meaningless.
pub fn evaluate_pair(yes_price: f64, no_price: f64, fee_a: f64, fee_b: f64) -> Option<f64> {
    if !(yes_price > 0.0 && yes_price < 1.0 && no_price > 0.0 && no_price < 1.0) {
        return None;
    }
    if fee_a >= 1.0 || fee_b >= 1.0 {
        return None;
    }
    let total_cost = yes_price / (1.0 - fee_a) + no_price / (1.0 - fee_b);
    Some(1.0 - total_cost)
}

/// Evaluate every ordered venue pair in every group against the edge
/// threshold.
///
/// Both directions of a pair are economically different trades (buy YES on
/// A / NO on B vs the reverse), so both are considered. A pair is skipped
/// when the YES side lacks a YES price or the NO side lacks a NO price.
/// Fees come as percentages per venue; venues absent from the table pay 0%.
/// `min_edge_percent` is an inclusive threshold.
///
/// Output may contain duplicate keys; callers pass it through
/// [`dedupe_and_rank`].
pub fn find_opportunities(
    groups: &[EventGroup],
    fees_percent: &HashMap<Platform, f64>,
    min_edge_percent: f64,
) -> Vec<ArbitrageOpportunity> {
    let mut opportunities = Vec::new();

    for group in groups {
        for yes_side in &group.markets {
            for no_side in &group.markets {
                if yes_side.platform == no_side.platform {
                    continue;
                }
                let (Some(yes_price), Some(no_price)) = (yes_side.yes_price, no_side.no_price)
                else {
                    continue;
                };

                let fee_a = fees_percent.get(&yes_side.platform).copied().unwrap_or(0.0) / 100.0;
                let fee_b = fees_percent.get(&no_side.platform).copied().unwrap_or(0.0) / 100.0;

                let Some(edge) = evaluate_pair(yes_price, no_price, fee_a, fee_b) else {
                    continue;
                };
                if edge * 100.0 < min_edge_percent {
                    continue;
                }

                let mut urls = Vec::new();
                for url in [&yes_side.url, &no_side.url].into_iter().flatten() {
                    if !url.is_empty() && !urls.contains(url) {
                        urls.push(url.clone());
                    }
                }

                opportunities.push(ArbitrageOpportunity {
                    title: yes_side.title.clone(),
                    buy_yes_on: yes_side.platform,
                    buy_no_on: no_side.platform,
                    yes_price,
                    no_price,
                    edge_percent: edge * 100.0,
                    urls,
                });
            }
        }
    }

    debug!(
        "{} raw opportunit(ies) above {:.2}% edge",
        opportunities.len(),
        min_edge_percent
    );
    opportunities
}

/// Drop duplicate opportunity keys and order by descending edge.
///
/// First occurrence wins on a duplicate key; later ones are discarded, not
/// merged, even when their edge differs. The sort is stable, so equal
/// edges keep their input order.
pub fn dedupe_and_rank(opportunities: Vec<ArbitrageOpportunity>) -> Vec<ArbitrageOpportunity> {
    let mut seen = HashSet::new();
    let mut unique: Vec<ArbitrageOpportunity> = opportunities
        .into_iter()
        .filter(|opp| seen.insert(opp.key()))
        .collect();

    unique.sort_by(|a, b| {
        b.edge_percent
            .partial_cmp(&a.edge_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    unique
}
