use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{AnalyticsError, OlResult};

/// An optionable underlying with its listing venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub symbol: String,
    pub exchange: String,
    pub asset_class: AssetClass,
}

impl Symbol {
    pub fn new(symbol: &str, exchange: &str, asset_class: AssetClass) -> Self {
        Self {
            symbol: symbol.to_string(),
            exchange: exchange.to_string(),
            asset_class,
        }
    }

    pub fn equity(symbol: &str) -> Self {
        Self::new(symbol, AssetClass::Equity.default_exchange(), AssetClass::Equity)
    }

    pub fn etf(symbol: &str) -> Self {
        Self::new(symbol, AssetClass::Etf.default_exchange(), AssetClass::Etf)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.symbol)
    }
}

/// Asset classes that carry listed equity-style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Equity,
    Etf,
    Index,
}

impl AssetClass {
    /// Default exchange identifier for this asset class.
    pub fn default_exchange(&self) -> &'static str {
        match self {
            AssetClass::Equity => "NASDAQ",
            AssetClass::Etf => "ARCA",
            AssetClass::Index => "CBOE",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetClass::Equity => "Equity",
            AssetClass::Etf => "ETF",
            AssetClass::Index => "Index",
        };
        write!(f, "{}", s)
    }
}

/// Daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub symbol: Symbol,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl DailyBar {
    pub fn new(
        symbol: Symbol,
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            symbol,
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Top-of-book quote for an underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub bid: Decimal,
    pub ask: Decimal,
}

impl Quote {
    pub fn new(symbol: Symbol, bid: Decimal, ask: Decimal) -> Self {
        Self { symbol, bid, ask }
    }

    /// A quote with no spread, e.g. a last trade or close.
    pub fn at(symbol: Symbol, price: Decimal) -> Self {
        Self::new(symbol, price, price)
    }

    /// Midpoint of bid and ask.
    pub fn mid(&self) -> Decimal {
        self.bid + self.spread() / Decimal::TWO
    }

    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> OlResult<Self> {
        if start > end {
            return Err(AnalyticsError::InvalidParameter {
                parameter: "date_range".to_string(),
                message: format!("start {start} is after end {end}"),
            }
            .into());
        }
        Ok(Self { start, end })
    }

    /// `today` through `today + days`, capped at the last representable date.
    pub fn days_ahead(today: NaiveDate, days: i64) -> Self {
        let span = Days::new(days.max(0).unsigned_abs());
        Self {
            start: today,
            end: today.checked_add_days(span).unwrap_or(NaiveDate::MAX),
        }
    }

    /// `today - days` through `today`, capped at the first representable date.
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        let span = Days::new(days.max(0).unsigned_abs());
        Self {
            start: today.checked_sub_days(span).unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
