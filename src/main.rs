//! Arbitrage Watcher CLI
//!
//! Watches binary prediction markets across venues for cross-platform
//! arbitrage.

use anyhow::Result;
use arb_watcher::{
    dedupe_and_rank, filter_excluded, find_opportunities, format_opportunity, gather_all,
    match_markets, ArbitrageOpportunity, Config, Notifier,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "arb-watcher")]
#[command(about = "Cross-platform prediction market arbitrage watcher")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan cycle and show ranked opportunities
    Scan {
        /// Maximum number of opportunities to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Watch continuously, alerting on every detected opportunity
    Run {
        /// Poll interval in seconds (overrides POLL_SECONDS)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    // Load configuration
    let config = Config::from_env()?;

    match cli.command {
        Commands::Scan { limit } => scan(&config, limit).await,
        Commands::Run { interval } => run_watcher(&config, interval).await,
    }

    Ok(())
}

/// One full evaluation cycle: fetch → filter → match → evaluate → rank.
///
/// Fetch failures are contained inside [`gather_all`], so a cycle always
/// yields a (possibly empty) result; no error here can abort a run.
async fn run_cycle(config: &Config) -> Vec<ArbitrageOpportunity> {
    let mut by_venue = gather_all(config).await;
    filter_excluded(&mut by_venue, &config.exclude_keywords);

    let groups = match_markets(&by_venue, config.title_similarity_threshold);
    dedupe_and_rank(find_opportunities(
        &groups,
        &config.fees_percent,
        config.min_edge_percent,
    ))
}

async fn scan(config: &Config, limit: usize) {
    println!("\n{}", "=".repeat(70));
    println!("  ARBITRAGE SCANNER");
    println!(
        "  Similarity: {} | Min edge: {:.2}% | Min liquidity: ${}",
        config.title_similarity_threshold, config.min_edge_percent, config.min_liquidity_usd
    );
    println!("{}\n", "=".repeat(70));

    let opportunities = run_cycle(config).await;
    print_opportunities(&opportunities, limit);

    if config.discord_webhook_url.is_some() {
        let notifier = Notifier::new(config.discord_webhook_url.clone());
        notifier.send_all(&opportunities).await;
    }
}

async fn run_watcher(config: &Config, interval: Option<u64>) {
    let poll_seconds = interval.unwrap_or(config.poll_seconds);

    println!("\n{}", "=".repeat(70));
    println!("  CONTINUOUS MODE");
    println!(
        "  Interval: {}s | Min edge: {:.2}%",
        poll_seconds, config.min_edge_percent
    );
    if config.discord_webhook_url.is_some() {
        println!("  Discord Webhook: ENABLED");
    }
    println!("{}\n", "=".repeat(70));

    let notifier = Notifier::new(config.discord_webhook_url.clone());

    println!("Starting continuous scan loop (Ctrl+C to stop)...\n");

    loop {
        let opportunities = run_cycle(config).await;

        if opportunities.is_empty() {
            info!("no arbs found on this run");
        } else {
            println!(
                "\n--- Scan at {} | {} opportunit(ies) ---",
                chrono::Utc::now().format("%H:%M:%S"),
                opportunities.len()
            );
            notifier.send_all(&opportunities).await;
        }

        tokio::time::sleep(Duration::from_secs(poll_seconds)).await;
    }
}

fn print_opportunities(opportunities: &[ArbitrageOpportunity], limit: usize) {
    if opportunities.is_empty() {
        println!("No arbitrage opportunities found.\n");
        return;
    }

    println!("ARBITRAGE OPPORTUNITIES (best edge first)");
    println!("{}", "-".repeat(70));

    for (i, opp) in opportunities.iter().take(limit).enumerate() {
        println!(
            "\n{}. {}",
            i + 1,
            format!("{:+.2}% edge", opp.edge_percent).green().bold()
        );
        for line in format_opportunity(opp).lines().skip(1) {
            println!("   {line}");
        }
    }

    if opportunities.len() > limit {
        println!("\n   ... and {} more", opportunities.len() - limit);
    }

    println!();
}
