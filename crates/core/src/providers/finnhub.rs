use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::quote::Quote;
use super::traits::QuoteProvider;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER: &str = "Finnhub";

/// Finnhub quote provider.
///
/// - **Requires an API key** (free tier available).
/// - **Endpoint**: `/quote?symbol=..&token=..`
///
/// Finnhub answers unknown symbols with an all-zero quote instead of an
/// HTTP error, so a zero current price is treated as "not available".
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(timeout);
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }
}

// ── Finnhub API response types ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Previous close
    pc: Option<f64>,
}

impl QuoteResponse {
    pub(crate) fn into_quote(self, symbol: &str) -> Result<Quote, CoreError> {
        match self.c {
            Some(price) if price != 0.0 => Ok(Quote::new(price, self.pc.unwrap_or(price))),
            _ => Err(CoreError::QuoteNotAvailable(symbol.to_string())),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for FinnhubProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let url = format!("{BASE_URL}/quote");

        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("HTTP {} for {symbol}", resp.status()),
            });
        }

        let body: QuoteResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quote for {symbol}: {e}"),
        })?;

        body.into_quote(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> QuoteResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn current_and_previous_close() {
        let q = parse(r#"{"c":261.74,"d":1.5,"dp":0.57,"h":263.3,"l":260.68,"o":261.07,"pc":260.24,"t":1700000000}"#)
            .into_quote("AAPL")
            .unwrap();
        assert_eq!(q, Quote::new(261.74, 260.24));
    }

    #[test]
    fn zero_price_means_unknown_symbol() {
        let err = parse(r#"{"c":0,"d":null,"dp":null,"h":0,"l":0,"o":0,"pc":0,"t":0}"#)
            .into_quote("NOPE")
            .unwrap_err();
        assert!(matches!(err, CoreError::QuoteNotAvailable(s) if s == "NOPE"));
    }

    #[test]
    fn missing_previous_close_falls_back_to_price() {
        let q = parse(r#"{"c":10.0}"#).into_quote("X").unwrap();
        assert_eq!(q, Quote::new(10.0, 10.0));
    }
}
