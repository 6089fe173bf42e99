//! Adaptive tick grid
//!
//! Derives a tick size proportional to the magnitude of a price, and the tick-aligned price at or
//! below it. Prices above 1 are normalised into `[1, 10)` before rounding so that the number of
//! ticks over a window stays roughly constant whether the price is 0.0005 or 50000.

use crate::decimal::{decimal_places, order_of_magnitude, pow10, pow10_neg, round_half_up};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tick size and tick-aligned price for one price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PriceTickSetup {
    /// Minimum price increment for the magnitude band of the input price, always > 0.
    pub tick_size: Decimal,
    /// Largest tick-aligned price <= the input price.
    pub fit_price: Decimal,
    /// Decimal places needed to display `tick_size` without loss.
    pub price_decimals: u32,
}

impl PriceTickSetup {
    /// Setup used for a zero price, which carries no magnitude information.
    pub const fn zero_price() -> Self {
        Self {
            tick_size: Decimal::from_parts(1, 0, 0, false, 3),
            fit_price: Decimal::from_parts(1, 0, 0, false, 3),
            price_decimals: 6,
        }
    }

    /// Setup used when a price has no usable order of magnitude (negative, or beyond the
    /// precision a [`Decimal`] can represent).
    pub const fn fallback() -> Self {
        Self {
            tick_size: Decimal::from_parts(1, 0, 0, false, 2),
            fit_price: Decimal::from_parts(1, 0, 0, false, 2),
            price_decimals: 1,
        }
    }

    /// Upper edge of the tick starting at `fit_price`.
    pub fn next_price(&self) -> Option<Decimal> {
        self.fit_price.checked_add(self.tick_size)
    }
}

/// Compute the tick size and tick-aligned price for `price`.
///
/// `precision` controls granularity: each extra digit makes the tick ten times finer. Zero and
/// degenerate prices never fail, they map to [`PriceTickSetup::zero_price`] and
/// [`PriceTickSetup::fallback`] respectively.
pub fn init_price_decimals(price: Decimal, precision: u32) -> PriceTickSetup {
    if price.is_zero() {
        return PriceTickSetup::zero_price();
    }

    fit_to_grid(price, precision).unwrap_or_else(|| {
        warn!(%price, precision, "price has no usable magnitude, using fallback tick grid");
        PriceTickSetup::fallback()
    })
}

fn fit_to_grid(price: Decimal, precision: u32) -> Option<PriceTickSetup> {
    let magnitude = order_of_magnitude(price)?;
    let wanted = i64::from(precision) - magnitude;

    // Prices above 1 are rounded in [1, 10) and rescaled at the end
    let (scale, calc_price, precision_diff) = if magnitude > 0 {
        let scale = pow10(u32::try_from(magnitude).ok()?)?;
        (Some(scale), price.checked_div(scale)?, wanted.max(2))
    } else {
        (None, price, wanted.max(0))
    };

    let precision_diff = u32::try_from(precision_diff).ok()?;
    let step = pow10_neg(precision)?;
    let min_tick = pow10_neg(precision_diff)?;

    let rounded = round_half_up(calc_price, precision_diff);
    let mut tick_size = round_half_up(rounded.checked_mul(step)?, precision_diff);
    if tick_size.is_zero() {
        tick_size = min_tick;
    }

    let remainder = calc_price.checked_rem(tick_size)?;
    let mut fit_price = round_half_up(calc_price.checked_sub(remainder)?, precision_diff);

    if let Some(scale) = scale {
        tick_size = tick_size.checked_mul(scale)?;
        fit_price = fit_price.checked_mul(scale)?;
    }

    Some(PriceTickSetup {
        tick_size,
        fit_price,
        price_decimals: decimal_places(tick_size),
    })
}

/// Default number of decimals to display a price of this magnitude with.
///
/// Keeps roughly four significant digits for small prices and drops decimals entirely from
/// 10000 upwards. A zero price shows 3 decimals.
pub fn display_decimals(price: Decimal) -> u32 {
    match order_of_magnitude(price.abs()) {
        Some(magnitude) => u32::try_from(3 - magnitude).unwrap_or(0),
        None => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_init_price_decimals() {
        struct TestCase {
            price: Decimal,
            precision: u32,
            expected: PriceTickSetup,
        }

        let tests = vec![
            TestCase {
                // TC0: sub-one price already on the grid
                price: dec!(0.6),
                precision: 1,
                expected: PriceTickSetup {
                    tick_size: dec!(0.06),
                    fit_price: dec!(0.6),
                    price_decimals: 2,
                },
            },
            TestCase {
                // TC1: sub-one price snapped down to the coarser grid
                price: dec!(0.66),
                precision: 1,
                expected: PriceTickSetup {
                    tick_size: dec!(0.07),
                    fit_price: dec!(0.63),
                    price_decimals: 2,
                },
            },
            TestCase {
                // TC2: price in [1, 10) is not normalised
                price: dec!(1.35),
                precision: 1,
                expected: PriceTickSetup {
                    tick_size: dec!(0.1),
                    fit_price: dec!(1.3),
                    price_decimals: 1,
                },
            },
            TestCase {
                // TC3: midpoint tick rounds away from zero
                price: dec!(1.5),
                precision: 1,
                expected: PriceTickSetup {
                    tick_size: dec!(0.2),
                    fit_price: dec!(1.4),
                    price_decimals: 1,
                },
            },
            TestCase {
                // TC4: tiny price with higher precision
                price: dec!(0.0013),
                precision: 2,
                expected: PriceTickSetup {
                    tick_size: dec!(0.00001),
                    fit_price: dec!(0.0013),
                    price_decimals: 5,
                },
            },
            TestCase {
                // TC5: tiny price at a midpoint tick
                price: dec!(0.0015),
                precision: 2,
                expected: PriceTickSetup {
                    tick_size: dec!(0.00002),
                    fit_price: dec!(0.0015),
                    price_decimals: 5,
                },
            },
            TestCase {
                // TC6: large price is normalised then rescaled
                price: dec!(50000),
                precision: 1,
                expected: PriceTickSetup {
                    tick_size: dec!(5000),
                    fit_price: dec!(50000),
                    price_decimals: 0,
                },
            },
            TestCase {
                // TC7: large price keeps at least two normalised decimals
                price: dec!(12345),
                precision: 2,
                expected: PriceTickSetup {
                    tick_size: dec!(100),
                    fit_price: dec!(12300),
                    price_decimals: 0,
                },
            },
            TestCase {
                // TC8: tick that would round to zero is clamped to the smallest increment
                price: dec!(40),
                precision: 3,
                expected: PriceTickSetup {
                    tick_size: dec!(0.1),
                    fit_price: dec!(40),
                    price_decimals: 1,
                },
            },
            TestCase {
                // TC9: zero price uses the fixed default
                price: Decimal::ZERO,
                precision: 4,
                expected: PriceTickSetup::zero_price(),
            },
            TestCase {
                // TC10: negative price has no magnitude
                price: dec!(-1),
                precision: 2,
                expected: PriceTickSetup::fallback(),
            },
            TestCase {
                // TC11: price too small for the requested precision
                price: Decimal::new(1, 27),
                precision: 4,
                expected: PriceTickSetup::fallback(),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = init_price_decimals(test.price, test.precision);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_fit_price_is_tick_aligned_and_not_above_price() {
        let prices = [
            dec!(0.18555136240000003),
            dec!(0.0004999),
            dec!(0.927756812),
            dec!(3.14159),
            dec!(87.5),
            dec!(49999.99),
            dec!(123456789.123),
        ];

        for precision in 0..=4 {
            for price in prices {
                let setup = init_price_decimals(price, precision);
                assert!(setup.tick_size > Decimal::ZERO, "{price} p{precision}");
                assert!(setup.fit_price <= price, "{price} p{precision}");
                assert!(
                    (setup.fit_price % setup.tick_size).is_zero(),
                    "{price} p{precision}: {setup:?}"
                );
            }
        }
    }

    #[test]
    fn test_tick_scales_with_magnitude() {
        // Ticks per decade stay in the same band regardless of absolute price level
        let small = init_price_decimals(dec!(0.0005), 2);
        let large = init_price_decimals(dec!(50000), 2);

        assert_eq!(dec!(0.0005) / small.tick_size, dec!(50000) / large.tick_size);
    }

    #[test]
    fn test_display_decimals() {
        struct TestCase {
            input: Decimal,
            expected: u32,
        }

        let tests = vec![
            TestCase {
                // TC0: zero price
                input: Decimal::ZERO,
                expected: 3,
            },
            TestCase {
                // TC1: unit price
                input: dec!(1),
                expected: 3,
            },
            TestCase {
                // TC2: small price keeps more decimals
                input: dec!(0.001),
                expected: 6,
            },
            TestCase {
                // TC3: large price has no decimals
                input: dec!(50000),
                expected: 0,
            },
            TestCase {
                // TC4: sign is ignored
                input: dec!(-0.5),
                expected: 4,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(display_decimals(test.input), test.expected, "TC{} failed", index);
        }
    }
}
