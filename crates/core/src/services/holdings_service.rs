use std::collections::BTreeMap;

use crate::models::holding::Holding;
use crate::models::transaction::{CashTransaction, Transaction};

/// Turns the transaction log into holdings.
///
/// Pure business logic: no I/O, no clock, no state. Safe to call on every
/// render or price tick.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Group trades by ticker and sum cash into a single balance row.
    ///
    /// Per ticker: `total_shares = Σ shares`, `total_cost = Σ shares × price`,
    /// `avg_buy_price = total_cost / total_shares` when `total_shares > 0`, else `0`.
    /// Flat positions are still reported. The cash row is appended only when
    /// the balance is nonzero.
    ///
    /// Output is sorted by ticker with cash last; input order never matters.
    /// NaN inputs are propagated, not coerced.
    pub fn aggregate_holdings(
        &self,
        transactions: &[Transaction],
        cash_transactions: &[CashTransaction],
    ) -> Vec<Holding> {
        let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
        for tx in transactions {
            let (shares, cost) = totals.entry(tx.ticker.as_str()).or_insert((0.0, 0.0));
            *shares += tx.shares;
            *cost += tx.cost();
        }

        let mut holdings: Vec<Holding> = totals
            .into_iter()
            .map(|(ticker, (shares, cost))| Holding::instrument(ticker, shares, cost))
            .collect();

        let cash_balance = self.cash_balance(cash_transactions);
        if cash_balance != 0.0 {
            holdings.push(Holding::cash(cash_balance));
        }

        holdings
    }

    /// Sum of all signed cash amounts.
    pub fn cash_balance(&self, cash_transactions: &[CashTransaction]) -> f64 {
        cash_transactions.iter().map(|c| c.amount).sum()
    }

    /// Tickers of all instrument holdings, in aggregation order.
    pub fn instrument_tickers(&self, holdings: &[Holding]) -> Vec<String> {
        holdings
            .iter()
            .filter(|h| !h.is_cash())
            .map(|h| h.ticker().to_string())
            .collect()
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}
