use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Live price snapshot for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Current (latest) price
    pub price: f64,

    /// Close of the previous session
    pub previous_close: f64,
}

impl Quote {
    pub fn new(price: f64, previous_close: f64) -> Self {
        Self {
            price,
            previous_close,
        }
    }

    /// Absolute move since the previous close.
    #[must_use]
    pub fn change(&self) -> f64 {
        self.price - self.previous_close
    }

    /// Percentage move since the previous close, `0` without a previous close.
    #[must_use]
    pub fn change_percent(&self) -> f64 {
        if self.previous_close != 0.0 {
            self.change() / self.previous_close * 100.0
        } else {
            0.0
        }
    }
}

/// Quotes keyed by ticker symbol.
pub type QuoteMap = HashMap<String, Quote>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedQuote {
    pub quote: Quote,
    pub fetched_at: DateTime<Utc>,
}

/// Short-lived in-memory cache of fetched quotes.
///
/// Entries expire after a TTL supplied by the caller. The current time is
/// always passed in, so the cache itself holds no clock.
#[derive(Debug, Clone, Default)]
pub struct QuoteCache {
    entries: HashMap<String, CachedQuote>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a quote fetched less than `ttl` before `now`.
    pub fn get_fresh(&self, symbol: &str, now: DateTime<Utc>, ttl: Duration) -> Option<Quote> {
        let entry = self.entries.get(&symbol.to_uppercase())?;
        if now - entry.fetched_at < ttl {
            Some(entry.quote)
        } else {
            None
        }
    }

    pub fn insert(&mut self, symbol: &str, quote: Quote, fetched_at: DateTime<Utc>) {
        self.entries
            .insert(symbol.to_uppercase(), CachedQuote { quote, fetched_at });
    }

    /// Drop every entry older than `ttl`. Returns the number removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| now - e.fetched_at < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
