//! Distribution Engine
//!
//! Splits a visible price window into tick-aligned buckets and spreads a two-asset deposit over
//! the buckets that overlap the deposit range:
//! - the base asset (`asset1`) sits above the mid price
//! - the quote currency (`asset2`) sits below it
//!
//! How the mass is shaped inside the range is decided by the [`CurveType`].

use crate::{
    decimal::format_fixed, distribution::config::DistributionConfig, error::DistributionError,
    tick::init_price_decimals,
};
use derive_more::Display;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod config;
pub mod render;

/// Weighting policy controlling how a deposit is spread over the price buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// Every bucket inside the range carries the same weight.
    #[display("equal")]
    Equal,
    /// Weight grows towards the range edges.
    #[display("spread")]
    Spread,
    /// Weight concentrates around the mid price.
    #[display("focused")]
    Focused,
    /// Whole deposit in one bucket spanning `[low, high]`.
    #[display("single")]
    Single,
    /// Whole deposit at a single price point, `low == high`.
    ///
    /// A non-zero width `[low, high]` is tolerated and placed in one bucket, same as `single`.
    #[display("wall")]
    Wall,
}

impl CurveType {
    /// Curves that skip bucketing and place the full deposit in one bucket.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, CurveType::Single | CurveType::Wall)
    }
}

/// Input to [`calculate_distribution`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DistributionRequest {
    pub curve: CurveType,
    /// Lower edge of the chart window to bucket.
    pub visible_from: Decimal,
    /// Upper edge of the chart window to bucket.
    pub visible_to: Decimal,
    pub low_price: Decimal,
    /// Reference (spot) price separating the two sides of the deposit.
    pub mid_price: Decimal,
    pub high_price: Decimal,
    /// Base asset deposit, `None` for a missing or NaN form value.
    pub deposit_asset_amount: Option<Decimal>,
    /// Quote currency deposit, `None` for a missing or NaN form value.
    pub deposit_currency_amount: Option<Decimal>,
    /// Tick granularity, each extra digit makes buckets ten times finer.
    pub precision: u32,
}

impl DistributionRequest {
    pub fn validate(&self) -> Result<(), DistributionError> {
        let prices = [
            self.visible_from,
            self.visible_to,
            self.low_price,
            self.mid_price,
            self.high_price,
        ];
        if let Some(price) = prices.into_iter().find(|price| *price < Decimal::ZERO) {
            return Err(DistributionError::NegativePrice(price));
        }

        if self.low_price > self.high_price {
            return Err(DistributionError::InvertedRange {
                low: self.low_price,
                high: self.high_price,
            });
        }

        if self.curve.is_degenerate() {
            return Ok(());
        }

        if self.mid_price < self.low_price || self.mid_price > self.high_price {
            return Err(DistributionError::UnorderedRange {
                low: self.low_price,
                mid: self.mid_price,
                high: self.high_price,
            });
        }

        if self.visible_from > self.visible_to {
            return Err(DistributionError::InvertedWindow {
                from: self.visible_from,
                to: self.visible_to,
            });
        }

        Ok(())
    }
}

/// One row of the distribution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DistributionBucket {
    pub from: Decimal,
    pub to: Decimal,
    /// Share of the base asset deposit.
    pub asset1_amount: Decimal,
    /// Share of the quote currency deposit.
    pub asset2_amount: Decimal,
}

/// Bucketed allocation table produced by [`calculate_distribution`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Distribution {
    /// `"<from> - <to>"` per bucket, formatted with the tick decimals of the window start.
    pub labels: Vec<String>,
    pub buckets: Vec<DistributionBucket>,
    /// Grid construction hit the bucket cap before reaching the end of the window.
    pub truncated: bool,
}

/// Columnar form of a [`Distribution`], as consumed by chart code.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DistributionColumns {
    pub labels: Vec<String>,
    pub asset1: Vec<Decimal>,
    pub asset2: Vec<Decimal>,
    pub min: Vec<Decimal>,
    pub max: Vec<Decimal>,
}

impl Distribution {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total_asset1(&self) -> Decimal {
        self.buckets.iter().map(|bucket| bucket.asset1_amount).sum()
    }

    pub fn total_asset2(&self) -> Decimal {
        self.buckets.iter().map(|bucket| bucket.asset2_amount).sum()
    }

    /// Buckets are strictly ascending and every bucket starts where the previous one ends.
    pub fn is_contiguous(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.to > bucket.from)
            && self
                .buckets
                .iter()
                .tuple_windows()
                .all(|(prev, next)| prev.to == next.from)
    }

    pub fn columns(&self) -> DistributionColumns {
        DistributionColumns {
            labels: self.labels.clone(),
            asset1: self.column(|bucket| bucket.asset1_amount),
            asset2: self.column(|bucket| bucket.asset2_amount),
            min: self.column(|bucket| bucket.from),
            max: self.column(|bucket| bucket.to),
        }
    }

    fn column(&self, field: impl Fn(&DistributionBucket) -> Decimal) -> Vec<Decimal> {
        self.buckets.iter().map(field).collect()
    }
}

/// Calculate a distribution with the default [`DistributionConfig`].
pub fn calculate_distribution(
    request: &DistributionRequest,
) -> Result<Distribution, DistributionError> {
    calculate_distribution_with(request, &DistributionConfig::default())
}

/// Bucket the visible window of `request` and allocate its deposits according to the curve.
///
/// Zero, missing and NaN deposits or a range that overlaps no bucket produce a zero-filled table.
/// Only a structurally invalid request (negative prices, out of order range) or config is an
/// error.
pub fn calculate_distribution_with(
    request: &DistributionRequest,
    config: &DistributionConfig,
) -> Result<Distribution, DistributionError> {
    config.validate()?;
    request.validate()?;

    if request.curve.is_degenerate() {
        return Ok(concentrated_position(request));
    }

    let grid = PriceGrid::build(request, config);

    let asset1_fractions = grid
        .ranges
        .iter()
        .map(|range| range.asset1_fraction(request))
        .collect::<Vec<_>>();
    let asset2_fractions = grid
        .ranges
        .iter()
        .map(|range| range.asset2_fraction(request))
        .collect::<Vec<_>>();

    // Nearest-to-mid first: upwards for the base asset, downwards for the currency
    let asset1_weights = curve_weights(
        asset1_fractions,
        0..grid.ranges.len(),
        request.curve,
        config,
    );
    let asset2_weights = curve_weights(
        asset2_fractions,
        (0..grid.ranges.len()).rev(),
        request.curve,
        config,
    );

    let deposit_asset = deposit_or_zero(request.deposit_asset_amount);
    let deposit_currency = deposit_or_zero(request.deposit_currency_amount);
    let asset1 = allocate(asset1_weights, deposit_asset);
    let asset2 = allocate(asset2_weights, deposit_currency);

    let labels = grid
        .ranges
        .iter()
        .map(|range| label(range.from, range.to, grid.label_decimals))
        .collect();

    let buckets = grid
        .ranges
        .iter()
        .zip(asset1)
        .zip(asset2)
        .map(|((range, asset1), asset2)| range.bucket(asset1, asset2))
        .collect::<Vec<_>>();

    debug!(
        curve = %request.curve,
        buckets = buckets.len(),
        truncated = grid.truncated,
        "calculated liquidity distribution"
    );

    Ok(Distribution {
        labels,
        buckets,
        truncated: grid.truncated,
    })
}

/// `single` / `wall`: one bucket over `[low, high]` holding the whole deposit.
fn concentrated_position(request: &DistributionRequest) -> Distribution {
    let decimals = init_price_decimals(request.low_price, request.precision).price_decimals;

    Distribution {
        labels: vec![label(request.low_price, request.high_price, decimals)],
        buckets: vec![DistributionBucket {
            from: request.low_price,
            to: request.high_price,
            asset1_amount: deposit_or_zero(request.deposit_asset_amount),
            asset2_amount: deposit_or_zero(request.deposit_currency_amount),
        }],
        truncated: false,
    }
}

fn label(from: Decimal, to: Decimal, decimals: u32) -> String {
    let from = format_fixed(from, decimals);
    let to = format_fixed(to, decimals);
    format!("{from} - {to}")
}

fn deposit_or_zero(amount: Option<Decimal>) -> Decimal {
    match amount {
        Some(amount) if amount >= Decimal::ZERO => amount,
        other => {
            debug!(deposit = ?other, "absorbing unusable deposit amount as zero");
            Decimal::ZERO
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PriceRange {
    from: Decimal,
    to: Decimal,
}

impl PriceRange {
    fn bucket(&self, asset1_amount: Decimal, asset2_amount: Decimal) -> DistributionBucket {
        DistributionBucket {
            from: self.from,
            to: self.to,
            asset1_amount,
            asset2_amount,
        }
    }

    fn width(&self) -> Decimal {
        self.to - self.from
    }

    /// Strict overlap, touching the deposit range at a single price does not count.
    fn overlaps(&self, low: Decimal, high: Decimal) -> bool {
        self.from < high && self.to > low
    }

    /// Portion of the range at or above the mid price.
    fn asset1_fraction(&self, request: &DistributionRequest) -> Decimal {
        let mid = request.mid_price;
        if !self.overlaps(request.low_price, request.high_price) || self.to <= mid {
            Decimal::ZERO
        } else if self.from >= mid {
            Decimal::ONE
        } else {
            (self.to - mid) / self.width()
        }
    }

    /// Portion of the range at or below the mid price.
    fn asset2_fraction(&self, request: &DistributionRequest) -> Decimal {
        let mid = request.mid_price;
        if !self.overlaps(request.low_price, request.high_price) || self.from >= mid {
            Decimal::ZERO
        } else if self.to <= mid {
            Decimal::ONE
        } else {
            (mid - self.from) / self.width()
        }
    }
}

#[derive(Debug)]
struct PriceGrid {
    ranges: Vec<PriceRange>,
    label_decimals: u32,
    truncated: bool,
}

impl PriceGrid {
    fn build(request: &DistributionRequest, config: &DistributionConfig) -> Self {
        let first = init_price_decimals(request.visible_from, request.precision);
        let label_decimals = first.price_decimals;

        let Some(first_to) = first.next_price() else {
            warn!(visible_from = %request.visible_from, "price grid overflowed on the first tick");
            return Self {
                ranges: vec![],
                label_decimals,
                truncated: true,
            };
        };

        let mut ranges = vec![PriceRange {
            from: first.fit_price,
            to: first_to,
        }];
        let mut price = first_to;
        let mut truncated = false;

        while price <= request.visible_to {
            let setup = init_price_decimals(price, request.precision);

            let next = match setup.next_price() {
                Some(next) if setup.fit_price <= price && next > price => next,
                _ => {
                    warn!(%price, ?setup, "price grid stopped advancing");
                    truncated = true;
                    break;
                }
            };

            if setup.fit_price < price {
                // Coarser tick past a magnitude boundary, widen the last bucket instead of overlapping it
                if let Some(last) = ranges.last_mut() {
                    last.to = next;
                }
            } else if setup.fit_price >= request.visible_to {
                break;
            } else if ranges.len() >= config.max_buckets {
                warn!(
                    max_buckets = config.max_buckets,
                    %price,
                    visible_to = %request.visible_to,
                    "price grid truncated at bucket cap"
                );
                truncated = true;
                break;
            } else {
                ranges.push(PriceRange {
                    from: setup.fit_price,
                    to: next,
                });
            }

            price = next;
        }

        Self {
            ranges,
            label_decimals,
            truncated,
        }
    }
}

/// Apply the curve multipliers to one asset's bucket fractions.
///
/// `outward` walks bucket indices starting nearest to the mid price. The multiplier starts at 1
/// on the first contributing bucket and shrinks by the curve ratio on every following one:
/// `focused` walks outward, `spread` walks inward from the far edge.
fn curve_weights(
    fractions: Vec<Decimal>,
    outward: impl Iterator<Item = usize>,
    curve: CurveType,
    config: &DistributionConfig,
) -> Vec<Decimal> {
    let Some(ratio) = config.ratio(curve) else {
        return fractions;
    };

    let mut contributing = outward
        .filter(|index| !fractions[*index].is_zero())
        .collect::<Vec<_>>();
    if curve == CurveType::Spread {
        contributing.reverse();
    }

    let decay = Decimal::ONE / ratio;
    let mut weights = fractions;
    let mut multiplier = Decimal::ONE;
    for index in contributing {
        weights[index] *= multiplier;
        multiplier *= decay;
    }

    weights
}

/// Scale raw weights so they sum to `deposit`.
fn allocate(weights: Vec<Decimal>, deposit: Decimal) -> Vec<Decimal> {
    let total = weights.iter().sum::<Decimal>();
    if deposit.is_zero() || total.is_zero() {
        return vec![Decimal::ZERO; weights.len()];
    }

    weights
        .into_iter()
        .map(|weight| {
            deposit
                .checked_mul(weight)
                .and_then(|scaled| scaled.checked_div(total))
                .or_else(|| {
                    weight
                        .checked_div(total)
                        .and_then(|share| share.checked_mul(deposit))
                })
                .unwrap_or(Decimal::ZERO)
        })
        .collect()
}
