//! Period Blender
//!
//! Pools report rolling-window counters per period: the window in progress (`now_*`) and the
//! last completed one (`prev_*`). Blending phases the previous window out linearly as the current
//! window fills, so the reported volume and price never jump at a window boundary.

use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name of one of the four rolling periods a pool tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKey {
    #[display("period1")]
    Period1,
    #[display("period2")]
    Period2,
    #[display("period3")]
    Period3,
    #[display("period4")]
    Period4,
}

impl PeriodKey {
    pub const ALL: [PeriodKey; 4] = [
        PeriodKey::Period1,
        PeriodKey::Period2,
        PeriodKey::Period3,
        PeriodKey::Period4,
    ];
}

/// Raw on-chain counters of one period, in fixed-point integer magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct PeriodStats {
    /// Window length.
    pub duration: u64,
    /// Time elapsed in the current window, may overshoot `duration` until the pool rolls over.
    pub now_time: u64,
    pub now_volume: u64,
    pub prev_volume: u64,
    /// Volume weighted average price of the current window.
    pub now_vwap: u64,
    /// Volume weighted average price of the previous window.
    pub prev_vwap: u64,
}

/// Blended estimate for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WeightedPeriod {
    pub price: Decimal,
    /// `now_volume + previous_volume_portion`.
    pub volume: Decimal,
    pub previous_price: Decimal,
    pub previous_volume: Decimal,
    /// Share of the previous window's volume still counted, decays to zero at `duration`.
    pub previous_volume_portion: Decimal,
}

impl PeriodStats {
    pub fn blend(&self) -> WeightedPeriod {
        let duration = Decimal::from(self.duration);
        let elapsed = Decimal::from(self.now_time.min(self.duration));
        let remaining = duration - elapsed;

        let now_volume = Decimal::from(self.now_volume);
        let now_vwap = Decimal::from(self.now_vwap);
        let previous_volume = Decimal::from(self.prev_volume);
        let previous_price = Decimal::from(self.prev_vwap);

        let previous_volume_portion = if duration.is_zero() {
            Decimal::ZERO
        } else {
            previous_volume
                .checked_mul(remaining)
                .and_then(|scaled| scaled.checked_div(duration))
                .unwrap_or_else(|| previous_volume * (remaining / duration))
        };

        let volume = now_volume + previous_volume_portion;

        let price = if volume.is_zero() {
            if now_vwap.is_zero() {
                previous_price
            } else {
                now_vwap
            }
        } else {
            vwap(
                [
                    (now_vwap, now_volume),
                    (previous_price, previous_volume_portion),
                ],
                volume,
            )
        };

        WeightedPeriod {
            price,
            volume,
            previous_price,
            previous_volume,
            previous_volume_portion,
        }
    }
}

/// Weighted mean of `(price, volume)` pairs whose volumes sum to `total_volume` (non-zero).
fn vwap(pairs: [(Decimal, Decimal); 2], total_volume: Decimal) -> Decimal {
    pairs
        .into_iter()
        .map(|(price, volume)| {
            price
                .checked_mul(volume)
                .and_then(|notional| notional.checked_div(total_volume))
                .unwrap_or_else(|| price * (volume / total_volume))
        })
        .sum()
}

/// Counters for all four periods of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct PoolPeriodStats {
    pub period1: PeriodStats,
    pub period2: PeriodStats,
    pub period3: PeriodStats,
    pub period4: PeriodStats,
}

impl PoolPeriodStats {
    pub fn period(&self, key: PeriodKey) -> &PeriodStats {
        match key {
            PeriodKey::Period1 => &self.period1,
            PeriodKey::Period2 => &self.period2,
            PeriodKey::Period3 => &self.period3,
            PeriodKey::Period4 => &self.period4,
        }
    }
}

/// Blended estimates for all four periods of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WeightedPeriods {
    pub period1: WeightedPeriod,
    pub period2: WeightedPeriod,
    pub period3: WeightedPeriod,
    pub period4: WeightedPeriod,
}

impl WeightedPeriods {
    pub fn get(&self, key: PeriodKey) -> &WeightedPeriod {
        match key {
            PeriodKey::Period1 => &self.period1,
            PeriodKey::Period2 => &self.period2,
            PeriodKey::Period3 => &self.period3,
            PeriodKey::Period4 => &self.period4,
        }
    }
}

pub fn compute_weighted_period(stats: &PoolPeriodStats, key: PeriodKey) -> WeightedPeriod {
    stats.period(key).blend()
}

pub fn compute_weighted_periods(stats: &PoolPeriodStats) -> WeightedPeriods {
    WeightedPeriods {
        period1: stats.period1.blend(),
        period2: stats.period2.blend(),
        period3: stats.period3.blend(),
        period4: stats.period4.blend(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stats(
        duration: u64,
        now_time: u64,
        now_volume: u64,
        prev_volume: u64,
        now_vwap: u64,
        prev_vwap: u64,
    ) -> PeriodStats {
        PeriodStats {
            duration,
            now_time,
            now_volume,
            prev_volume,
            now_vwap,
            prev_vwap,
        }
    }

    #[test]
    fn test_blend() {
        struct TestCase {
            input: PeriodStats,
            expected_volume: Decimal,
            expected_price: Decimal,
            expected_portion: Decimal,
        }

        let tests = vec![
            TestCase {
                // TC0: two thirds through the window keeps a third of the previous volume
                input: stats(30, 20, 300, 600, 200, 180),
                expected_volume: dec!(500),
                expected_price: dec!(192),
                expected_portion: dec!(200),
            },
            TestCase {
                // TC1: window complete, previous window fully phased out
                input: stats(30, 30, 300, 600, 200, 180),
                expected_volume: dec!(300),
                expected_price: dec!(200),
                expected_portion: dec!(0),
            },
            TestCase {
                // TC2: elapsed time past the window is clamped
                input: stats(30, 45, 300, 600, 200, 180),
                expected_volume: dec!(300),
                expected_price: dec!(200),
                expected_portion: dec!(0),
            },
            TestCase {
                // TC3: window just started, previous window fully counted
                input: stats(30, 0, 0, 600, 0, 180),
                expected_volume: dec!(600),
                expected_price: dec!(180),
                expected_portion: dec!(600),
            },
            TestCase {
                // TC4: empty previous window
                input: stats(30, 10, 300, 0, 200, 0),
                expected_volume: dec!(300),
                expected_price: dec!(200),
                expected_portion: dec!(0),
            },
            TestCase {
                // TC5: zero duration drops the previous window
                input: stats(0, 10, 300, 600, 200, 180),
                expected_volume: dec!(300),
                expected_price: dec!(200),
                expected_portion: dec!(0),
            },
            TestCase {
                // TC6: no volume falls back to the current price
                input: stats(30, 10, 0, 0, 210, 180),
                expected_volume: dec!(0),
                expected_price: dec!(210),
                expected_portion: dec!(0),
            },
            TestCase {
                // TC7: no volume and no current price falls back to the previous price
                input: stats(30, 30, 0, 600, 0, 180),
                expected_volume: dec!(0),
                expected_price: dec!(180),
                expected_portion: dec!(0),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.blend();
            assert_eq!(actual.volume, test.expected_volume, "TC{} failed", index);
            assert_eq!(actual.price, test.expected_price, "TC{} failed", index);
            assert_eq!(
                actual.previous_volume_portion, test.expected_portion,
                "TC{} failed",
                index
            );
            assert_eq!(
                actual.volume,
                Decimal::from(test.input.now_volume) + actual.previous_volume_portion,
                "TC{} failed",
                index
            );
        }
    }

    #[test]
    fn test_previous_portion_decays_linearly() {
        let portions = (0..=4)
            .map(|now_time| stats(4, now_time, 0, 100, 0, 0).blend())
            .map(|period| period.previous_volume_portion)
            .collect::<Vec<_>>();

        assert_eq!(
            portions,
            vec![dec!(100), dec!(75), dec!(50), dec!(25), dec!(0)]
        );
    }

    #[test]
    fn test_extreme_counters_do_not_overflow() {
        let actual = stats(u64::MAX, 1, u64::MAX, u64::MAX, u64::MAX, u64::MAX).blend();

        assert!(actual.volume > Decimal::from(u64::MAX));
        assert!(actual.previous_volume_portion < Decimal::from(u64::MAX));
        assert!((actual.price - Decimal::from(u64::MAX)).abs() < Decimal::ONE);
    }

    #[test]
    fn test_compute_weighted_periods_are_independent() {
        let pool = PoolPeriodStats {
            period1: stats(10, 5, 100, 100, 10, 20),
            period2: stats(30, 20, 300, 600, 200, 180),
            period3: stats(0, 0, 0, 0, 0, 0),
            period4: stats(60, 60, 7, 9, 11, 13),
        };

        let all = compute_weighted_periods(&pool);

        for key in PeriodKey::ALL {
            assert_eq!(*all.get(key), compute_weighted_period(&pool, key), "{key}");
            assert_eq!(*all.get(key), pool.period(key).blend(), "{key}");
        }

        assert_eq!(all.period1.volume, dec!(150));
        assert_eq!(all.period2.price, dec!(192));
        assert_eq!(all.period3.price, Decimal::ZERO);
        assert_eq!(all.period4.volume, dec!(7));
    }

    #[test]
    fn test_period_key_names() {
        let names = PeriodKey::ALL.map(|key| key.to_string());
        assert_eq!(names, ["period1", "period2", "period3", "period4"]);

        let parsed: PeriodKey = serde_json::from_str(r#""period3""#).unwrap();
        assert_eq!(parsed, PeriodKey::Period3);
    }

    #[test]
    fn test_pool_stats_from_json() {
        let pool: PoolPeriodStats = serde_json::from_str(
            r#"{
                "period1": {"duration": 30, "now_time": 20, "now_volume": 300, "prev_volume": 600, "now_vwap": 200, "prev_vwap": 180},
                "period2": {"duration": 0, "now_time": 0, "now_volume": 0, "prev_volume": 0, "now_vwap": 0, "prev_vwap": 0},
                "period3": {"duration": 0, "now_time": 0, "now_volume": 0, "prev_volume": 0, "now_vwap": 0, "prev_vwap": 0},
                "period4": {"duration": 0, "now_time": 0, "now_volume": 0, "prev_volume": 0, "now_vwap": 0, "prev_vwap": 0}
            }"#,
        )
        .unwrap();

        assert_eq!(pool.period1, stats(30, 20, 300, 600, 200, 180));
        let period1 = compute_weighted_period(&pool, PeriodKey::Period1);
        assert_eq!(period1.volume, dec!(500));
    }
}
