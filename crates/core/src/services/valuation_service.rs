use crate::models::holding::Holding;
use crate::models::quote::{Quote, QuoteMap};
use crate::models::valuation::{PortfolioTotals, PortfolioValuation, ValuedHolding};

/// Combines holdings with live quotes into presentation-ready numbers.
///
/// Deterministic: the same holdings and quotes always give the same output.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value every holding and sum the portfolio totals.
    ///
    /// Cash is worth its balance and never gains or moves. An instrument with
    /// no quote is valued at price `0` / previous close `0`, so its row shows
    /// zero value and a loss of its full cost rather than disappearing.
    pub fn value_holdings(&self, holdings: &[Holding], quotes: &QuoteMap) -> PortfolioValuation {
        let mut per_holding: Vec<ValuedHolding> = holdings
            .iter()
            .map(|h| self.value_holding(h, quotes))
            .collect();

        let mut totals = PortfolioTotals::default();
        for v in &per_holding {
            totals.total_value += v.current_value;
            totals.total_gain += v.unrealized_gain;
            totals.total_daily_change += v.daily_change;
            match &v.holding {
                Holding::CashBalance { amount } => totals.cash_balance += amount,
                Holding::Instrument {
                    total_shares,
                    avg_buy_price,
                    ..
                } => totals.total_cost_basis += avg_buy_price * total_shares,
            }
        }
        totals.total_gain_percent = if totals.total_cost_basis > 0.0 {
            totals.total_gain / totals.total_cost_basis * 100.0
        } else {
            0.0
        };

        for v in &mut per_holding {
            v.allocation_percent = if totals.total_value > 0.0 {
                v.current_value / totals.total_value * 100.0
            } else {
                0.0
            };
        }

        PortfolioValuation {
            per_holding,
            totals,
        }
    }

    fn value_holding(&self, holding: &Holding, quotes: &QuoteMap) -> ValuedHolding {
        match holding {
            Holding::CashBalance { amount } => ValuedHolding {
                holding: holding.clone(),
                current_price: 1.0,
                previous_close: 1.0,
                current_value: *amount,
                unrealized_gain: 0.0,
                unrealized_gain_percent: 0.0,
                daily_change: 0.0,
                allocation_percent: 0.0,
            },
            Holding::Instrument {
                ticker,
                total_shares,
                avg_buy_price,
            } => {
                let q = quotes
                    .get(ticker)
                    .copied()
                    .unwrap_or_else(|| Quote::new(0.0, 0.0));
                let unrealized_gain_percent = if *avg_buy_price > 0.0 {
                    (q.price - avg_buy_price) / avg_buy_price * 100.0
                } else {
                    0.0
                };
                ValuedHolding {
                    holding: holding.clone(),
                    current_price: q.price,
                    previous_close: q.previous_close,
                    current_value: total_shares * q.price,
                    unrealized_gain: (q.price - avg_buy_price) * total_shares,
                    unrealized_gain_percent,
                    daily_change: (q.price - q.previous_close) * total_shares,
                    allocation_percent: 0.0,
                }
            }
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
