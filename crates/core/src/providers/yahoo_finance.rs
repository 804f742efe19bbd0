use async_trait::async_trait;
use chrono::DateTime;

use crate::errors::CoreError;
use crate::models::history::{PriceHistory, PricePoint, SymbolMatch, Timeframe};
use crate::models::quote::Quote;
use super::traits::QuoteProvider;

const PROVIDER: &str = "Yahoo Finance";

/// Exchanges accepted by symbol search: Nasdaq, NYSE and Nasdaq Capital Market.
const SEARCH_EXCHANGES: [&str; 3] = ["NMS", "NYQ", "NCM"];

/// Yahoo Finance quote provider.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices (`^GSPC`, `^DJI`, ...).
///
/// Reads the last five daily bars: the newest close is the current price,
/// the one before it is the previous close.
///
/// **Note**: Not WASM-compatible (uses native reqwest/tokio).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self { connector })
    }

    async fn bars(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<Vec<yahoo_finance_api::Quote>, CoreError> {
        let resp = self
            .connector
            .get_quote_range(symbol, interval, range)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch {range} range for {symbol}: {e}"),
            })?;

        resp.quotes().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No quote data for {symbol}: {e}"),
        })
    }
}

/// Build a quote from daily closes, oldest first.
pub(crate) fn quote_from_closes(symbol: &str, closes: &[f64]) -> Result<Quote, CoreError> {
    match closes {
        [] => Err(CoreError::QuoteNotAvailable(symbol.to_string())),
        [only] => Ok(Quote::new(*only, *only)),
        [.., previous, latest] => Ok(Quote::new(*latest, *previous)),
    }
}

/// Turn raw bars into a series. Bars with a bad timestamp or close are skipped.
pub(crate) fn history_from_bars(
    symbol: &str,
    timeframe: Timeframe,
    bars: &[yahoo_finance_api::Quote],
) -> Result<PriceHistory, CoreError> {
    let finite = |v: f64| v.is_finite().then_some(v);
    let points: Vec<PricePoint> = bars
        .iter()
        .filter_map(|bar| {
            Some(PricePoint {
                timestamp: DateTime::from_timestamp(bar.timestamp, 0)?,
                open: finite(bar.open),
                high: finite(bar.high),
                low: finite(bar.low),
                close: finite(bar.close)?,
            })
        })
        .collect();

    let history = PriceHistory::new(symbol, timeframe, points);
    if history.is_empty() {
        return Err(CoreError::QuoteNotAvailable(symbol.to_string()));
    }
    Ok(history)
}

/// Listed equities on the supported US exchanges only.
pub(crate) fn is_searchable(quote_type: &str, exchange: &str) -> bool {
    quote_type == "EQUITY" && SEARCH_EXCHANGES.contains(&exchange)
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let closes: Vec<f64> = self
            .bars(symbol, "1d", "5d")
            .await?
            .iter()
            .map(|q| q.close)
            .filter(|c| c.is_finite())
            .collect();
        quote_from_closes(symbol, &closes)
    }

    async fn get_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<PriceHistory, CoreError> {
        let bars = self
            .bars(symbol, timeframe.interval(), timeframe.range())
            .await?;
        history_from_bars(symbol, timeframe, &bars)
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        let result = self
            .connector
            .search_ticker_opt(query)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Search for '{query}' failed: {e}"),
            })?;

        Ok(result
            .quotes
            .into_iter()
            .filter(|q| is_searchable(&q.quote_type, &q.exchange))
            .map(|q| SymbolMatch {
                name: q
                    .short_name
                    .or(q.long_name)
                    .unwrap_or_else(|| q.symbol.clone()),
                symbol: q.symbol,
                exchange: q.exchange,
                quote_type: q.quote_type,
            })
            .collect())
    }
}
