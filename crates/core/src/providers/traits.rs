use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::history::{PriceHistory, SymbolMatch, Timeframe};
use crate::models::quote::Quote;

/// Trait abstraction for live quote sources.
///
/// Each API (Yahoo Finance, Finnhub) implements this trait. If an API stops
/// working or changes, only that one implementation is replaced.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Get the current price and previous session close for a symbol.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError>;

    /// Price bars for `symbol` over `timeframe`.
    /// Providers without a history endpoint keep the default error.
    async fn get_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<PriceHistory, CoreError> {
        Err(CoreError::Api {
            provider: self.name().to_string(),
            message: format!("price history not supported ({symbol}, {timeframe})"),
        })
    }

    /// Find tradable symbols matching free text.
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        Err(CoreError::Api {
            provider: self.name().to_string(),
            message: format!("symbol search not supported ('{query}')"),
        })
    }
}
