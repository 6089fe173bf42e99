use crate::decimal::pow10;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resting order of the order book, in base units of the asset and currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quote {
    pub amount: u64,
    pub quote_amount: u64,
}

impl Quote {
    /// Unit price of the order, adjusted for the decimals of the asset and the currency.
    ///
    /// `None` for an order without a quote amount.
    pub fn price(&self, asset_decimals: u32, currency_decimals: u32) -> Option<Decimal> {
        if self.quote_amount == 0 {
            return None;
        }

        let ratio = Decimal::from(self.amount).checked_div(Decimal::from(self.quote_amount))?;

        if asset_decimals >= currency_decimals {
            ratio.checked_mul(pow10(asset_decimals - currency_decimals)?)
        } else {
            ratio.checked_div(pow10(currency_decimals - asset_decimals)?)
        }
    }
}

/// Mid price and width of the top of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct MidAndRange {
    pub mid_price: Decimal,
    /// Best offer minus best bid.
    pub mid_range: Decimal,
}

/// Derive the [`MidAndRange`] from the best bid and offer, `None` unless both sides are priced.
pub fn mid_and_range(
    best_bid: Option<&Quote>,
    best_offer: Option<&Quote>,
    asset_decimals: u32,
    currency_decimals: u32,
) -> Option<MidAndRange> {
    let (Some(bid), Some(offer)) = (best_bid, best_offer) else {
        debug!("order book side empty, no mid price");
        return None;
    };

    let bid = bid.price(asset_decimals, currency_decimals)?;
    let offer = offer.price(asset_decimals, currency_decimals)?;

    Some(MidAndRange {
        mid_price: bid.checked_add(offer)? / Decimal::TWO,
        mid_range: offer.checked_sub(bid)?,
    })
}
