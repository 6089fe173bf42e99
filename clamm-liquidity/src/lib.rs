//! Clamm Liquidity - price grid, deposit distribution and period blending
//!
//! Pure numeric building blocks behind a concentrated-liquidity front end:
//! - [`tick`]: adaptive tick size and tick-aligned price for any price magnitude
//! - [`distribution`]: bucket a visible price window and spread a two-asset deposit over it
//! - [`period`]: blend current and previous rolling-window volume / VWAP statistics
//! - [`quote`]: mid price and range from the best bid and offer
//!
//! Every function is synchronous and side-effect free, so callers may invoke them concurrently
//! without coordination.
pub mod decimal;
pub mod distribution;
pub mod error;
pub mod period;
pub mod quote;
pub mod tick;

// Re-export commonly used types for convenience
pub use distribution::{
    CurveType, Distribution, DistributionBucket, DistributionColumns, DistributionRequest,
    calculate_distribution, calculate_distribution_with,
    config::DistributionConfig,
    render::{DEFAULT_RENDER_DECIMALS, render_distribution},
};
pub use error::{ConfigError, DistributionError};
pub use period::{
    PeriodKey, PeriodStats, PoolPeriodStats, WeightedPeriod, WeightedPeriods,
    compute_weighted_period, compute_weighted_periods,
};
pub use quote::{MidAndRange, Quote, mid_and_range};
pub use tick::{PriceTickSetup, display_decimals, init_price_decimals};
