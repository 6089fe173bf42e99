//! Debug front door over the liquidity engine.
//!
//! ```text
//! clamm-inspect distribution [FILE]   JSON DistributionRequest -> labels + bucket lines
//! clamm-inspect periods [FILE]        JSON PoolPeriodStats -> blended line per period
//! clamm-inspect quote [FILE]          JSON best bid / offer -> mid price and range
//! ```
//!
//! Input is read from stdin when no file is given. Tuning comes from the environment:
//! `CLAMM_MAX_BUCKETS`, `CLAMM_FOCUSED_RATIO`, `CLAMM_SPREAD_RATIO`, `CLAMM_RENDER_DECIMALS`.

use clamm_liquidity::{
    DEFAULT_RENDER_DECIMALS, DistributionConfig, DistributionRequest, PeriodKey, PoolPeriodStats,
    Quote, calculate_distribution_with, compute_weighted_periods, decimal::format_fixed,
    display_decimals, mid_and_range, render_distribution,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{error::Error, io::Read};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct QuoteInput {
    best_bid: Option<Quote>,
    best_offer: Option<Quote>,
    asset_decimals: u32,
    currency_decimals: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();
    let path = args.next();

    match command.as_str() {
        "distribution" => inspect_distribution(&read_input(path.as_deref())?),
        "periods" => inspect_periods(&read_input(path.as_deref())?),
        "quote" => inspect_quote(&read_input(path.as_deref())?),
        other => Err(format!(
            "unknown command '{other}', expected one of: distribution, periods, quote"
        )
        .into()),
    }
}

fn inspect_distribution(input: &str) -> Result<(), Box<dyn Error>> {
    let request: DistributionRequest = serde_json::from_str(input)?;
    let config = distribution_config();
    let decimals = render_decimals();

    let distribution = calculate_distribution_with(&request, &config)?;
    info!(
        curve = %request.curve,
        buckets = distribution.len(),
        truncated = distribution.truncated,
        "distribution calculated"
    );

    for (label, line) in distribution
        .labels
        .iter()
        .zip(render_distribution(Some(&distribution), decimals))
    {
        println!("{label:>24}  {line}");
    }

    println!(
        "total asset1 {} / asset2 {}",
        format_fixed(distribution.total_asset1(), decimals),
        format_fixed(distribution.total_asset2(), decimals)
    );

    Ok(())
}

fn inspect_periods(input: &str) -> Result<(), Box<dyn Error>> {
    let stats: PoolPeriodStats = serde_json::from_str(input)?;
    let weighted = compute_weighted_periods(&stats);

    for key in PeriodKey::ALL {
        let period = weighted.get(key);
        println!(
            "{key}: price {} volume {} (previous {} @ {}, portion {})",
            format_price(period.price),
            period.volume.round_dp(2),
            period.previous_volume,
            format_price(period.previous_price),
            period.previous_volume_portion.round_dp(2),
        );
    }

    Ok(())
}

fn inspect_quote(input: &str) -> Result<(), Box<dyn Error>> {
    let input: QuoteInput = serde_json::from_str(input)?;

    match mid_and_range(
        input.best_bid.as_ref(),
        input.best_offer.as_ref(),
        input.asset_decimals,
        input.currency_decimals,
    ) {
        Some(book) => println!(
            "mid {} range {}",
            format_price(book.mid_price),
            format_fixed(book.mid_range, display_decimals(book.mid_price))
        ),
        None => println!("no mid price, order book side empty"),
    }

    Ok(())
}

/// Price with the default display decimals of its magnitude.
fn format_price(price: Decimal) -> String {
    format_fixed(price, display_decimals(price))
}

fn read_input(path: Option<&str>) -> Result<String, Box<dyn Error>> {
    let input = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    Ok(input)
}

/// DistributionConfig from `CLAMM_*` env vars, falling back to the defaults.
fn distribution_config() -> DistributionConfig {
    let mut config = DistributionConfig::default();

    if let Some(max_buckets) = env_parse::<usize>("CLAMM_MAX_BUCKETS") {
        config = config.with_max_buckets(max_buckets);
    }
    if let Some(ratio) = env_parse::<Decimal>("CLAMM_FOCUSED_RATIO") {
        config = config.with_focused_ratio(ratio);
    }
    if let Some(ratio) = env_parse::<Decimal>("CLAMM_SPREAD_RATIO") {
        config = config.with_spread_ratio(ratio);
    }

    config
}

fn render_decimals() -> u32 {
    env_parse("CLAMM_RENDER_DECIMALS").unwrap_or(DEFAULT_RENDER_DECIMALS)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    let parsed = value.parse().ok();
    if parsed.is_none() {
        warn!(%name, %value, "ignoring unparsable environment override");
    }
    parsed
}

/// Initialise logging to stderr, keeping stdout for the inspected output.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
