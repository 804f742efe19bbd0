use serde::{Deserialize, Serialize};

/// Pseudo-ticker under which the cash balance is presented.
pub const CASH_TICKER: &str = "Cash";

/// Aggregated net position. Derived from the ledger, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Holding {
    /// Net position in one ticker.
    #[serde(rename_all = "camelCase")]
    Instrument {
        ticker: String,
        total_shares: f64,
        /// Cost-weighted average price; `0` when `total_shares <= 0`.
        avg_buy_price: f64,
    },
    /// Net balance of the cash sub-account.
    #[serde(rename_all = "camelCase")]
    CashBalance { amount: f64 },
}

impl Holding {
    /// Build an instrument holding from summed shares and summed cost.
    ///
    /// A flat or net-short position has no meaningful average cost and
    /// reports `0`.
    pub fn instrument(ticker: impl Into<String>, total_shares: f64, total_cost: f64) -> Self {
        let avg_buy_price = if total_shares > 0.0 {
            total_cost / total_shares
        } else {
            0.0
        };
        Holding::Instrument {
            ticker: ticker.into(),
            total_shares,
            avg_buy_price,
        }
    }

    pub fn cash(amount: f64) -> Self {
        Holding::CashBalance { amount }
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        match self {
            Holding::Instrument { ticker, .. } => ticker,
            Holding::CashBalance { .. } => CASH_TICKER,
        }
    }

    /// Shares held, or the balance for cash.
    #[must_use]
    pub fn total_shares(&self) -> f64 {
        match self {
            Holding::Instrument { total_shares, .. } => *total_shares,
            Holding::CashBalance { amount } => *amount,
        }
    }

    /// For cash this is the balance itself.
    #[must_use]
    pub fn avg_buy_price(&self) -> f64 {
        match self {
            Holding::Instrument { avg_buy_price, .. } => *avg_buy_price,
            Holding::CashBalance { amount } => *amount,
        }
    }

    #[must_use]
    pub fn is_cash(&self) -> bool {
        matches!(self, Holding::CashBalance { .. })
    }
}
