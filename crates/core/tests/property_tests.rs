// ═══════════════════════════════════════════════════════════════════
// Property Tests: aggregation and valuation invariants
// ═══════════════════════════════════════════════════════════════════
//
// Shares and prices are whole numbers so every intermediate f64 sum is
// exact and reordering cannot introduce rounding differences.

use chrono::NaiveDate;
use proptest::prelude::*;

use portfolio_ledger_core::models::holding::Holding;
use portfolio_ledger_core::models::quote::{Quote, QuoteMap};
use portfolio_ledger_core::models::transaction::{CashTransaction, Transaction};
use portfolio_ledger_core::services::holdings_service::HoldingsService;
use portfolio_ledger_core::services::ledger_service::LedgerService;
use portfolio_ledger_core::services::valuation_service::ValuationService;

const TICKERS: [&str; 4] = ["AAPL", "MSFT", "TSLA", "VOO"];

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (
        prop::sample::select(TICKERS.to_vec()),
        (-50i32..=50).prop_filter("non-zero", |s| *s != 0),
        1u32..=1000,
        0u32..365,
    )
        .prop_map(|(ticker, shares, price, day)| {
            let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(day as u64);
            Transaction::new(ticker, date, f64::from(shares), f64::from(price))
        })
}

fn arb_cash() -> impl Strategy<Value = CashTransaction> {
    (1u32..=10_000, any::<bool>()).prop_map(|(amount, deposit)| {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        if deposit {
            CashTransaction::deposit(date, f64::from(amount))
        } else {
            CashTransaction::withdrawal(date, f64::from(amount))
        }
    })
}

fn arb_quotes() -> impl Strategy<Value = QuoteMap> {
    prop::collection::vec((1u32..=2000, 1u32..=2000), TICKERS.len()).prop_map(|prices| {
        TICKERS
            .iter()
            .zip(prices)
            .map(|(t, (p, pc))| (t.to_string(), Quote::new(f64::from(p), f64::from(pc))))
            .collect()
    })
}

proptest! {
    #[test]
    fn aggregation_is_order_independent(
        (txs, shuffled) in prop::collection::vec(arb_transaction(), 0..40)
            .prop_flat_map(|txs| (Just(txs.clone()), Just(txs).prop_shuffle())),
        cash in prop::collection::vec(arb_cash(), 0..10),
    ) {
        let svc = HoldingsService::new();
        prop_assert_eq!(
            svc.aggregate_holdings(&txs, &cash),
            svc.aggregate_holdings(&shuffled, &cash)
        );
    }

    #[test]
    fn aggregation_is_idempotent(
        txs in prop::collection::vec(arb_transaction(), 0..40),
        cash in prop::collection::vec(arb_cash(), 0..10),
    ) {
        let svc = HoldingsService::new();
        prop_assert_eq!(
            svc.aggregate_holdings(&txs, &cash),
            svc.aggregate_holdings(&txs, &cash)
        );
    }

    #[test]
    fn one_row_per_ticker_with_cash_last(
        txs in prop::collection::vec(arb_transaction(), 0..40),
        cash in prop::collection::vec(arb_cash(), 0..10),
    ) {
        let holdings = HoldingsService::new().aggregate_holdings(&txs, &cash);

        let instruments: Vec<&str> = holdings
            .iter()
            .filter(|h| !h.is_cash())
            .map(|h| h.ticker())
            .collect();
        let mut sorted = instruments.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(&instruments, &sorted);

        let cash_rows = holdings.iter().filter(|h| h.is_cash()).count();
        let balance: f64 = cash.iter().map(|c| c.amount).sum();
        prop_assert_eq!(cash_rows, usize::from(balance != 0.0));
        if cash_rows == 1 {
            prop_assert!(holdings.last().map(Holding::is_cash).unwrap_or(false));
        }
    }

    #[test]
    fn share_totals_match_the_log(txs in prop::collection::vec(arb_transaction(), 0..40)) {
        let holdings = HoldingsService::new().aggregate_holdings(&txs, &[]);
        for h in &holdings {
            let expected: f64 = txs
                .iter()
                .filter(|t| t.ticker == h.ticker())
                .map(|t| t.shares)
                .sum();
            prop_assert_eq!(h.total_shares(), expected);
            prop_assert!(h.avg_buy_price().is_finite());
        }
    }

    #[test]
    fn totals_are_sums_of_rows(
        txs in prop::collection::vec(arb_transaction(), 0..40),
        cash in prop::collection::vec(arb_cash(), 0..10),
        quotes in arb_quotes(),
    ) {
        let holdings = HoldingsService::new().aggregate_holdings(&txs, &cash);
        let v = ValuationService::new().value_holdings(&holdings, &quotes);

        prop_assert_eq!(v.per_holding.len(), holdings.len());
        let value: f64 = v.per_holding.iter().map(|r| r.current_value).sum();
        let gain: f64 = v.per_holding.iter().map(|r| r.unrealized_gain).sum();
        let daily: f64 = v.per_holding.iter().map(|r| r.daily_change).sum();
        prop_assert_eq!(v.totals.total_value, value);
        prop_assert_eq!(v.totals.total_gain, gain);
        prop_assert_eq!(v.totals.total_daily_change, daily);
    }

    #[test]
    fn delete_then_add_restores_length(
        txs in prop::collection::vec(arb_transaction(), 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let svc = LedgerService::new();
        let display_index = pick.index(txs.len());
        let removed = svc.display_order(&txs)[display_index].clone();

        let shorter = svc.delete_displayed(&txs, display_index).unwrap();
        prop_assert_eq!(shorter.len(), txs.len() - 1);
        prop_assert!(shorter.iter().all(|t| t.id != removed.id));
        prop_assert_eq!(svc.add_entry(&shorter, removed).len(), txs.len());
    }
}
