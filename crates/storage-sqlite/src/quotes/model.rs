//! Database model for cached quotes.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use log::warn;
use marketcache_market_data::Quote;
use rust_decimal::Decimal;

use crate::utils::{format_date, parse_date, parse_decimal};

/// One row per symbol. Decimals and dates are stored as text.
#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::quotes)]
#[diesel(primary_key(symbol))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuoteDB {
    pub symbol: String,
    pub name: Option<String>,
    pub bid: Option<String>,
    pub ask: Option<String>,
    pub open: Option<String>,
    pub previous_close: Option<String>,
    pub last_trade_price: Option<String>,
    pub day_low: Option<String>,
    pub day_high: Option<String>,
    pub year_low: Option<String>,
    pub year_high: Option<String>,
    pub ma50: Option<String>,
    pub ma200: Option<String>,
    pub dividend_per_share: Option<String>,
    pub dividend_yield: Option<String>,
    pub dividend_ex_date: Option<String>,
    pub price_earnings: Option<String>,
    pub earnings_per_share: Option<String>,
    pub volume: Option<i64>,
    pub avg_daily_volume: Option<i64>,
    pub updated_at: String,
}

fn decimal_to_text(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

/// An unreadable stored value is dropped rather than failing the whole row.
fn text_to_decimal(symbol: &str, field: &str, value: Option<String>) -> Option<Decimal> {
    let value = value?;
    match parse_decimal(&value) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!("Ignoring stored {} of {}: {}", field, symbol, e);
            None
        }
    }
}

impl From<&Quote> for QuoteDB {
    fn from(quote: &Quote) -> Self {
        QuoteDB {
            symbol: quote.symbol.clone(),
            name: quote.name.clone(),
            bid: decimal_to_text(quote.bid),
            ask: decimal_to_text(quote.ask),
            open: decimal_to_text(quote.open),
            previous_close: decimal_to_text(quote.previous_close),
            last_trade_price: decimal_to_text(quote.last_trade_price),
            day_low: decimal_to_text(quote.day_low),
            day_high: decimal_to_text(quote.day_high),
            year_low: decimal_to_text(quote.year_low),
            year_high: decimal_to_text(quote.year_high),
            ma50: decimal_to_text(quote.ma50),
            ma200: decimal_to_text(quote.ma200),
            dividend_per_share: decimal_to_text(quote.dividend_per_share),
            dividend_yield: decimal_to_text(quote.dividend_yield),
            dividend_ex_date: quote.dividend_ex_date.map(format_date),
            price_earnings: decimal_to_text(quote.price_earnings),
            earnings_per_share: decimal_to_text(quote.earnings_per_share),
            volume: quote.volume,
            avg_daily_volume: quote.avg_daily_volume,
            updated_at: quote
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl From<QuoteDB> for Quote {
    fn from(db: QuoteDB) -> Self {
        let symbol = db.symbol;
        // unparseable timestamps count as infinitely old so the row gets refreshed
        let updated_at = DateTime::parse_from_rfc3339(&db.updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH);
        let dividend_ex_date = db
            .dividend_ex_date
            .and_then(|s| parse_date(&s).ok());

        Quote {
            name: db.name,
            bid: text_to_decimal(&symbol, "bid", db.bid),
            ask: text_to_decimal(&symbol, "ask", db.ask),
            open: text_to_decimal(&symbol, "open", db.open),
            previous_close: text_to_decimal(&symbol, "previous_close", db.previous_close),
            last_trade_price: text_to_decimal(&symbol, "last_trade_price", db.last_trade_price),
            day_low: text_to_decimal(&symbol, "day_low", db.day_low),
            day_high: text_to_decimal(&symbol, "day_high", db.day_high),
            year_low: text_to_decimal(&symbol, "year_low", db.year_low),
            year_high: text_to_decimal(&symbol, "year_high", db.year_high),
            ma50: text_to_decimal(&symbol, "ma50", db.ma50),
            ma200: text_to_decimal(&symbol, "ma200", db.ma200),
            dividend_per_share: text_to_decimal(&symbol, "dividend_per_share", db.dividend_per_share),
            dividend_yield: text_to_decimal(&symbol, "dividend_yield", db.dividend_yield),
            dividend_ex_date,
            price_earnings: text_to_decimal(&symbol, "price_earnings", db.price_earnings),
            earnings_per_share: text_to_decimal(
                &symbol,
                "earnings_per_share",
                db.earnings_per_share,
            ),
            volume: db.volume,
            avg_daily_volume: db.avg_daily_volume,
            updated_at,
            symbol,
        }
    }
}
