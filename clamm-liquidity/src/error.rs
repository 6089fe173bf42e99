use crate::distribution::CurveType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated when validating a distribution request.
///
/// Degenerate numeric input (zero prices, empty deposits, no overlap with the deposit range) is
/// absorbed into a zero-filled table instead; only structurally meaningless requests end up here.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize, Error)]
pub enum DistributionError {
    #[error("price range out of order: expected low {low} <= mid {mid} <= high {high}")]
    UnorderedRange {
        low: Decimal,
        mid: Decimal,
        high: Decimal,
    },

    #[error("price range inverted: low {low} > high {high}")]
    InvertedRange { low: Decimal, high: Decimal },

    #[error("visible window inverted: from {from} > to {to}")]
    InvertedWindow { from: Decimal, to: Decimal },

    #[error("negative price: {0}")]
    NegativePrice(Decimal),

    #[error("invalid distribution config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Errors generated by [`DistributionConfig::validate`](crate::DistributionConfig::validate).
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize, Error)]
pub enum ConfigError {
    #[error("max_buckets must be at least 1")]
    ZeroMaxBuckets,

    #[error("{curve} curve ratio must be >= 1, got {ratio}")]
    CurveRatioBelowOne { curve: CurveType, ratio: Decimal },
}
