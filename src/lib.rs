//! Cross-Platform Arbitrage Watcher Library
//!
//! Detects arbitrage across binary prediction market venues:
//!
//! 1. **Ingest**: per-venue fetchers produce normalized, liquidity-filtered
//!    market quotes.
//! 2. **Match**: fuzzy token-set grouping pairs up quotes that describe the
//!    same real-world event despite inconsistent titles.
//! 3. **Evaluate**: for every matched group, buying YES on one venue and NO
//!    on another locks in a profit when the fee-adjusted combined cost is
//!    under the $1.00 payout.
//!
//! The matching/evaluation core is pure and synchronous; fetching and alert
//! delivery are the only async edges.

pub mod arbitrage;
pub mod config;
pub mod fetchers;
pub mod matcher;
pub mod notifier;
pub mod types;

pub use arbitrage::{dedupe_and_rank, evaluate_pair, find_opportunities};
pub use config::Config;
pub use fetchers::gather_all;
pub use matcher::{filter_excluded, match_markets, normalize_title, token_set_ratio};
pub use notifier::{format_opportunity, Notifier};
pub use types::{ArbitrageOpportunity, EventGroup, NormalizedMarket, Platform};
