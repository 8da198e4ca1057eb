//! Market data provider seam and the value types it yields

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Latest quote for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeQuote {
    /// Ticker symbol as reported by the provider
    pub symbol: String,
    /// Display name
    pub short_name: Option<String>,
    /// Last traded price
    pub price: f64,
    /// Absolute change since previous close
    pub change: f64,
    /// Percent change since previous close (already scaled, `1.5` means 1.5%)
    pub change_percent: f64,
    /// Previous session close
    pub previous_close: Option<f64>,
    /// Session volume
    pub volume: Option<u64>,
    /// Quote currency
    pub currency: Option<String>,
    /// Time of the last trade
    pub market_time: Option<DateTime<Utc>>,
}

/// One OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Bar timestamp
    pub date: DateTime<Utc>,
    /// Open
    pub open: f64,
    /// High
    pub high: f64,
    /// Low
    pub low: f64,
    /// Close
    pub close: f64,
    /// Volume
    pub volume: u64,
}

/// A news headline for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline
    pub title: String,
    /// Body text used for scoring (full content, else summary)
    pub text: String,
    /// Short plain-text summary
    pub summary: String,
    /// Publication time
    pub published_at: Option<DateTime<Utc>>,
}

/// A symbol search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMatch {
    /// Ticker symbol
    pub symbol: String,
    /// Display name
    pub short_name: Option<String>,
    /// Exchange display name
    pub exchange: Option<String>,
    /// Instrument type, e.g. `Equity`
    pub type_display: Option<String>,
}

/// Look-back window for daily history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPeriod {
    /// One month
    #[default]
    OneMonth,
    /// Six months
    SixMonths,
    /// One year
    OneYear,
}

impl HistoryPeriod {
    /// Parse `1mo`, `6mo` or `1y`; anything else is one month
    #[must_use]
    pub fn parse(period: &str) -> Self {
        match period {
            "6mo" => Self::SixMonths,
            "1y" => Self::OneYear,
            _ => Self::OneMonth,
        }
    }

    /// Number of calendar months covered
    #[must_use]
    pub fn months(self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::SixMonths => 6,
            Self::OneYear => 12,
        }
    }

    /// First day of the window ending at `today`
    #[must_use]
    pub fn start_date(self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Absolute date range for a history request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRange {
    /// Inclusive start
    pub start: NaiveDate,
    /// Inclusive end
    pub end: NaiveDate,
    /// Bar interval, e.g. `1d`
    pub interval: String,
}

impl HistoryRange {
    /// Range for `period` ending at `today`
    #[must_use]
    pub fn ending(today: NaiveDate, period: HistoryPeriod, interval: impl Into<String>) -> Self {
        Self {
            start: period.start_date(today),
            end: today,
            interval: interval.into(),
        }
    }
}

/// Remote source of quotes, bars, headlines and symbol lookups
///
/// Implementations report "nothing found" as `None` or an empty list; the
/// [`MarketDataClient`](crate::MarketDataClient) turns those into typed errors.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Latest quote
    async fn quote(&self, symbol: &str) -> Result<Option<RealTimeQuote>>;

    /// Bars inside `range`, any order
    async fn daily_history(&self, symbol: &str, range: &HistoryRange) -> Result<Vec<DailyBar>>;

    /// Recent headlines, newest first
    async fn news(&self, symbol: &str) -> Result<Vec<NewsItem>>;

    /// Symbols matching free-text keywords
    async fn search(&self, keywords: &str) -> Result<Vec<SymbolMatch>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_parse_defaults_to_one_month() {
        assert_eq!(HistoryPeriod::parse("1mo"), HistoryPeriod::OneMonth);
        assert_eq!(HistoryPeriod::parse("6mo"), HistoryPeriod::SixMonths);
        assert_eq!(HistoryPeriod::parse("1y"), HistoryPeriod::OneYear);
        assert_eq!(HistoryPeriod::parse("5d"), HistoryPeriod::OneMonth);
        assert_eq!(HistoryPeriod::parse(""), HistoryPeriod::OneMonth);
    }

    #[test]
    fn test_start_date_offsets() {
        let today = date(2024, 8, 31);
        assert_eq!(HistoryPeriod::OneMonth.start_date(today), date(2024, 7, 31));
        assert_eq!(HistoryPeriod::SixMonths.start_date(today), date(2024, 2, 29));
        assert_eq!(HistoryPeriod::OneYear.start_date(today), date(2023, 8, 31));
    }

    #[test]
    fn test_range_ending_today() {
        let range = HistoryRange::ending(date(2024, 3, 15), HistoryPeriod::OneMonth, "1d");
        assert_eq!(range.start, date(2024, 2, 15));
        assert_eq!(range.end, date(2024, 3, 15));
        assert_eq!(range.interval, "1d");
    }
}
