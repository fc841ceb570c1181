use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Low/high pair for a trading period (day or 52 weeks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: Decimal,
    pub high: Decimal,
}

impl PriceRange {
    /// Distance between high and low.
    pub fn spread(&self) -> Decimal {
        self.high - self.low
    }

    /// Returns true if `price` lies within the range (inclusive).
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.low && price <= self.high
    }
}

/// Point-in-time snapshot for a single symbol.
///
/// All market fields are optional: providers routinely omit some of them,
/// and the cache stores whatever the provider returned.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Symbol as requested by the consumer
    pub symbol: String,

    /// Instrument display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,

    /// Last traded price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_trade_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_low: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_high: Option<Decimal>,

    /// 52 week low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_low: Option<Decimal>,

    /// 52 week high
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_high: Option<Decimal>,

    /// 50 day moving average
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma50: Option<Decimal>,

    /// 200 day moving average
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma200: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_per_share: Option<Decimal>,

    /// Dividend yield in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_ex_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_earnings: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings_per_share: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_daily_volume: Option<i64>,

    /// When this snapshot was last written to the cache.
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Create a quote carrying only a symbol and a last trade price.
    pub fn new(symbol: impl Into<String>, last_trade_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            last_trade_price: Some(last_trade_price),
            updated_at: Utc::now(),
            ..Default::default()
        }
    }

    pub fn day_range(&self) -> Option<PriceRange> {
        Some(PriceRange {
            low: self.day_low?,
            high: self.day_high?,
        })
    }

    pub fn year_range(&self) -> Option<PriceRange> {
        Some(PriceRange {
            low: self.year_low?,
            high: self.year_high?,
        })
    }

    /// Absolute change of the last trade against the previous close.
    pub fn change(&self) -> Option<Decimal> {
        Some(self.last_trade_price? - self.previous_close?)
    }

    /// Relative change in percent. `None` when the previous close is zero.
    pub fn change_percent(&self) -> Option<Decimal> {
        let previous = self.previous_close?;
        if previous.is_zero() {
            return None;
        }
        Some(self.change()? / previous * Decimal::ONE_HUNDRED)
    }
}
