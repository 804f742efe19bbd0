use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chart window offered by the price-history screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "2Y")]
    TwoYears,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "MAX")]
    Max,
}

impl Timeframe {
    pub const ALL: [Timeframe; 8] = [
        Timeframe::OneDay,
        Timeframe::FiveDays,
        Timeframe::OneMonth,
        Timeframe::SixMonths,
        Timeframe::OneYear,
        Timeframe::TwoYears,
        Timeframe::FiveYears,
        Timeframe::Max,
    ];

    /// Yahoo `range` parameter.
    #[must_use]
    pub fn range(self) -> &'static str {
        match self {
            Timeframe::OneDay => "1d",
            Timeframe::FiveDays => "5d",
            Timeframe::OneMonth => "1mo",
            Timeframe::SixMonths => "6mo",
            Timeframe::OneYear => "1y",
            Timeframe::TwoYears => "2y",
            Timeframe::FiveYears => "5y",
            Timeframe::Max => "max",
        }
    }

    /// Bar size: intraday for the two shortest windows, daily otherwise.
    #[must_use]
    pub fn interval(self) -> &'static str {
        match self {
            Timeframe::OneDay => "5m",
            Timeframe::FiveDays => "15m",
            _ => "1d",
        }
    }

    #[must_use]
    pub fn is_intraday(self) -> bool {
        matches!(self, Timeframe::OneDay | Timeframe::FiveDays)
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Timeframe::OneDay => "1D",
            Timeframe::FiveDays => "5D",
            Timeframe::OneMonth => "1M",
            Timeframe::SixMonths => "6M",
            Timeframe::OneYear => "1Y",
            Timeframe::TwoYears => "2Y",
            Timeframe::FiveYears => "5Y",
            Timeframe::Max => "MAX",
        };
        f.write_str(label)
    }
}

/// One bar of a price series. Only `close` is guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
}

/// Price series for one symbol over one timeframe, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistory {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    /// Build a series, dropping bars without a finite close and sorting by time.
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, points: Vec<PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.close.is_finite())
            .collect();
        points.sort_by_key(|p| p.timestamp);
        Self {
            symbol: symbol.into(),
            timeframe,
            points,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn first_close(&self) -> Option<f64> {
        self.points.first().map(|p| p.close)
    }

    #[must_use]
    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Move from the first to the last close, in percent. `0` when undefined.
    #[must_use]
    pub fn change_percent(&self) -> f64 {
        match (self.first_close(), self.last_close()) {
            (Some(first), Some(last)) if first != 0.0 => (last - first) / first * 100.0,
            _ => 0.0,
        }
    }
}

/// A search hit for the "add to watchlist" box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub quote_type: String,
}
