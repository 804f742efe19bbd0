use serde::{Deserialize, Serialize};

use super::transaction::{CashTransaction, Transaction};

/// The two persisted transaction lists.
///
/// Both lists are kept in insertion order; display code shows them
/// newest-first. Holdings and valuations are always derived from here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// All buy/sell transactions
    pub transactions: Vec<Transaction>,

    /// All deposits and withdrawals
    #[serde(default)]
    pub cash_transactions: Vec<CashTransaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.cash_transactions.is_empty()
    }
}
