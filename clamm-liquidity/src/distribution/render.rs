use crate::{
    decimal::format_fixed,
    distribution::{Distribution, DistributionBucket},
};
use std::fmt;

/// Decimal places used when rendering amounts and prices without an explicit precision.
pub const DEFAULT_RENDER_DECIMALS: u32 = 2;

/// Placeholder line for a missing distribution.
pub const NO_DISTRIBUTION: &str = "<No distribution>";

impl DistributionBucket {
    /// `<from[asset1,asset2]to>` with every number fixed to `decimals` places.
    pub fn render(&self, decimals: u32) -> String {
        format!(
            "<{}[{},{}]{}>",
            format_fixed(self.from, decimals),
            format_fixed(self.asset1_amount, decimals),
            format_fixed(self.asset2_amount, decimals),
            format_fixed(self.to, decimals),
        )
    }
}

/// Honours the formatter precision, eg. `{:.4}`, else [`DEFAULT_RENDER_DECIMALS`].
impl fmt::Display for DistributionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = f
            .precision()
            .and_then(|precision| u32::try_from(precision).ok())
            .unwrap_or(DEFAULT_RENDER_DECIMALS);

        f.write_str(&self.render(decimals))
    }
}

/// Render each bucket of `distribution` on its own line, or a single [`NO_DISTRIBUTION`] line
/// when there is nothing to show.
pub fn render_distribution(distribution: Option<&Distribution>, decimals: u32) -> Vec<String> {
    match distribution {
        Some(distribution) if !distribution.is_empty() => distribution
            .buckets
            .iter()
            .map(|bucket| bucket.render(decimals))
            .collect(),
        _ => vec![NO_DISTRIBUTION.to_string()],
    }
}
