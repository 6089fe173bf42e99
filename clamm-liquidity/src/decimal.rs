//! Decimal helpers shared by the tick grid, distribution and rendering code.
//!
//! All price and amount math runs on [`Decimal`]; these helpers keep magnitude detection,
//! powers of ten and fixed-point rendering exact instead of detouring through `f64`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Largest scale a [`Decimal`] can carry.
pub const MAX_SCALE: u32 = 28;

/// Order of magnitude of a positive value, ie. `floor(log10(value))`.
///
/// Derived from the mantissa digit count and scale, so exact powers of ten never land one
/// magnitude low the way a floating point `log10` can. Returns `None` for zero or negative input.
pub fn order_of_magnitude(value: Decimal) -> Option<i64> {
    if value.is_zero() || value.is_sign_negative() {
        return None;
    }

    let normalized = value.normalize();
    let digits = normalized.mantissa().unsigned_abs().ilog10() as i64 + 1;

    Some(digits - 1 - normalized.scale() as i64)
}

/// `10^exp`, or `None` if it does not fit in a [`Decimal`].
pub fn pow10(exp: u32) -> Option<Decimal> {
    if exp > MAX_SCALE {
        return None;
    }
    Decimal::try_from_i128_with_scale(10_i128.pow(exp), 0).ok()
}

/// `10^-exp`, or `None` if the scale exceeds [`MAX_SCALE`].
pub fn pow10_neg(exp: u32) -> Option<Decimal> {
    if exp > MAX_SCALE {
        return None;
    }
    Decimal::try_new(1, exp).ok()
}

/// Round to `dp` decimal places, midpoints away from zero.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Render `value` with exactly `dp` decimal places (rounded, then zero padded).
pub fn format_fixed(value: Decimal, dp: u32) -> String {
    format!("{:.*}", dp as usize, round_half_up(value, dp))
}

/// Number of decimal places needed to print `value` without loss.
pub fn decimal_places(value: Decimal) -> u32 {
    value.normalize().scale()
}
