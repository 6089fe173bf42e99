use crate::{distribution::CurveType, error::ConfigError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default cap on the number of buckets a single distribution may contain.
pub const DEFAULT_MAX_BUCKETS: usize = 1000;

/// Tuning for the Distribution Engine.
///
/// The curve ratios are the per-bucket step between neighbouring multipliers. `focused` applies
/// its ratio moving away from the mid price, `spread` moving towards it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DistributionConfig {
    /// Runaway guard: grid construction stops once this many buckets exist.
    pub max_buckets: usize,
    /// Step ratio concentrating a `focused` deposit around the mid price.
    pub focused_ratio: Decimal,
    /// Step ratio pushing a `spread` deposit out towards the range edges.
    pub spread_ratio: Decimal,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            max_buckets: DEFAULT_MAX_BUCKETS,
            focused_ratio: Decimal::new(12, 1),
            spread_ratio: Decimal::new(13, 1),
        }
    }
}

impl DistributionConfig {
    /// Create a new configuration with a custom bucket cap
    pub fn new(max_buckets: usize) -> Self {
        Self {
            max_buckets,
            ..Default::default()
        }
    }

    /// Set bucket cap
    pub fn with_max_buckets(mut self, max_buckets: usize) -> Self {
        self.max_buckets = max_buckets;
        self
    }

    /// Set `focused` step ratio
    pub fn with_focused_ratio(mut self, ratio: Decimal) -> Self {
        self.focused_ratio = ratio;
        self
    }

    /// Set `spread` step ratio
    pub fn with_spread_ratio(mut self, ratio: Decimal) -> Self {
        self.spread_ratio = ratio;
        self
    }

    /// Step ratio for a weighted curve, `None` for curves without multipliers.
    pub fn ratio(&self, curve: CurveType) -> Option<Decimal> {
        match curve {
            CurveType::Focused => Some(self.focused_ratio),
            CurveType::Spread => Some(self.spread_ratio),
            CurveType::Equal | CurveType::Single | CurveType::Wall => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_buckets == 0 {
            return Err(ConfigError::ZeroMaxBuckets);
        }

        for curve in [CurveType::Focused, CurveType::Spread] {
            if let Some(ratio) = self.ratio(curve) {
                if ratio < Decimal::ONE {
                    return Err(ConfigError::CurveRatioBelowOne { curve, ratio });
                }
            }
        }

        Ok(())
    }
}
