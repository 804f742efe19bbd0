use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};

use crate::errors::CoreError;
use crate::models::history::{PriceHistory, SymbolMatch, Timeframe};
use crate::models::quote::{Quote, QuoteCache, QuoteMap};
use crate::providers::registry::QuoteProviderRegistry;

/// Fetches live quotes from the registered providers with a short TTL cache.
///
/// Cache strategy:
/// - A quote younger than the TTL is served from `QuoteCache` without a request.
/// - Otherwise providers are tried in registration order until one answers
///   with a finite, non-negative price.
///
/// The current time is a parameter so refresh behaviour is testable.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn has_providers(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Get a quote for one symbol: cache first, then providers with fallback.
    pub async fn get_quote(
        &self,
        cache: &mut QuoteCache,
        symbol: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Quote, CoreError> {
        if let Some(quote) = cache.get_fresh(symbol, now, ttl) {
            debug!("quote cache hit for {symbol}");
            return Ok(quote);
        }

        debug!("quote cache miss for {symbol}");
        let quote = self.fetch_quote(symbol).await?;
        cache.insert(symbol, quote, now);
        Ok(quote)
    }

    /// Fetch quotes for many symbols.
    ///
    /// Symbols that no provider could answer are left out of the map; the
    /// valuation step treats an absent quote as a zero price.
    pub async fn get_quotes(
        &self,
        cache: &mut QuoteCache,
        symbols: &[String],
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> QuoteMap {
        let mut quotes = QuoteMap::new();
        for symbol in symbols {
            if quotes.contains_key(symbol) {
                continue;
            }
            match self.get_quote(cache, symbol, now, ttl).await {
                Ok(quote) => {
                    quotes.insert(symbol.clone(), quote);
                }
                Err(e) => warn!("no quote for {symbol}: {e}"),
            }
        }
        quotes
    }

    /// Price history for one symbol. Not cached; charts are fetched on demand.
    pub async fn get_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<PriceHistory, CoreError> {
        if self.registry.is_empty() {
            return Err(CoreError::NoProvider(symbol.to_string()));
        }

        let mut last_error = None;
        for provider in self.registry.providers() {
            match provider.get_history(symbol, timeframe).await {
                Ok(history) if !history.is_empty() => return Ok(history),
                Ok(_) => {
                    last_error = Some(CoreError::QuoteNotAvailable(symbol.to_string()));
                }
                Err(e) => {
                    warn!("{} has no {timeframe} history for {symbol}: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(symbol.to_string())))
    }

    /// Search providers in order; the first successful answer wins, even if empty.
    /// A blank query matches nothing and makes no request.
    pub async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        if self.registry.is_empty() {
            return Err(CoreError::NoProvider(query.to_string()));
        }

        let mut last_error = None;
        for provider in self.registry.providers() {
            match provider.search_symbols(query).await {
                Ok(matches) => {
                    debug!("{} found {} match(es) for '{query}'", provider.name(), matches.len());
                    return Ok(matches);
                }
                Err(e) => {
                    warn!("{} search failed for '{query}': {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(query.to_string())))
    }

    /// Internal: ask each provider in order until one returns a usable quote.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        if self.registry.is_empty() {
            return Err(CoreError::NoProvider(symbol.to_string()));
        }

        let mut last_error = None;
        for provider in self.registry.providers() {
            match provider.get_quote(symbol).await {
                Ok(quote) => {
                    if !quote.price.is_finite() || quote.price < 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid price returned for {symbol}: {} (must be finite and non-negative)",
                                quote.price
                            ),
                        });
                        continue;
                    }
                    return Ok(quote);
                }
                Err(e) => {
                    warn!("{} failed for {symbol}, trying next provider: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(symbol.to_string())))
    }
}
