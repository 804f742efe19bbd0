use serde::{Deserialize, Serialize};

use super::holding::Holding;

/// One holding combined with its live quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuedHolding {
    pub holding: Holding,

    /// Price used for valuation (`0` when no quote was available, `1` for cash)
    pub current_price: f64,

    /// Previous close used for the daily change
    pub previous_close: f64,

    /// `total_shares × current_price`
    pub current_value: f64,

    /// `(current_price − avg_buy_price) × total_shares`
    pub unrealized_gain: f64,

    /// Gain relative to average cost, `0` without a positive cost basis
    pub unrealized_gain_percent: f64,

    /// `(current_price − previous_close) × total_shares`
    pub daily_change: f64,

    /// Share of the total portfolio value
    pub allocation_percent: f64,
}

impl ValuedHolding {
    #[must_use]
    pub fn ticker(&self) -> &str {
        self.holding.ticker()
    }
}

/// Portfolio-level sums over every valued holding, cash included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_value: f64,
    pub total_gain: f64,
    pub total_daily_change: f64,

    /// Net cash balance (0 when there is no cash row)
    pub cash_balance: f64,

    /// Σ avg_buy_price × total_shares over instruments
    pub total_cost_basis: f64,

    /// `total_gain / total_cost_basis × 100`, `0` without a positive cost basis
    pub total_gain_percent: f64,
}

/// Output of a valuation pass, ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub per_holding: Vec<ValuedHolding>,
    pub totals: PortfolioTotals,
}
