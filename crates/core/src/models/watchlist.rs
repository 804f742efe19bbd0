use serde::{Deserialize, Serialize};

/// Market indices shown by default.
pub const DEFAULT_INDICES: [&str; 5] = ["^GSPC", "^DJI", "^IXIC", "^RUT", "^VIX"];

/// Popular stocks shown by default after the indices.
pub const DEFAULT_STOCKS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "META"];

/// Ordered list of symbols the user follows (not necessarily holds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchlist {
    pub symbols: Vec<String>,
}

impl Default for Watchlist {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_INDICES
                .iter()
                .chain(DEFAULT_STOCKS.iter())
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Watchlist {
    pub fn empty() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    /// Append a symbol. Returns `false` if it is blank or already present.
    pub fn add(&mut self, symbol: &str) -> bool {
        let normalized = symbol.trim().to_uppercase();
        if normalized.is_empty() || self.contains(&normalized) {
            return false;
        }
        self.symbols.push(normalized);
        true
    }

    /// Remove a symbol. Returns `false` if it was not present.
    pub fn remove(&mut self, symbol: &str) -> bool {
        let normalized = symbol.trim().to_uppercase();
        let before = self.symbols.len();
        self.symbols.retain(|s| *s != normalized);
        self.symbols.len() != before
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        let normalized = symbol.trim().to_uppercase();
        self.symbols.iter().any(|s| *s == normalized)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
