use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single buy or sell of a tradable instrument.
///
/// `shares` is signed: positive = acquired, negative = disposed.
/// Transactions are never edited, only appended or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identifier. Older blobs without one get a fresh id on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Ticker symbol, trimmed and uppercased (e.g., "AAPL")
    pub ticker: String,

    /// Execution date (daily granularity)
    pub date: NaiveDate,

    /// Signed share quantity
    pub shares: f64,

    /// Price per share at execution
    pub price: f64,
}

impl Transaction {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, shares: f64, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.into().trim().to_uppercase(),
            date,
            shares,
            price,
        }
    }

    /// Cash moved by this trade (`shares × price`), negative for sells.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.shares * self.price
    }
}

/// Direction of a cash movement. Display only: the sign of
/// [`CashTransaction::amount`] is what aggregation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CashTransactionType {
    Deposit,
    Withdrawal,
}

impl CashTransactionType {
    /// Sign applied to a positive magnitude at creation time.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            CashTransactionType::Deposit => 1.0,
            CashTransactionType::Withdrawal => -1.0,
        }
    }
}

impl std::fmt::Display for CashTransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CashTransactionType::Deposit => write!(f, "DEPOSIT"),
            CashTransactionType::Withdrawal => write!(f, "WITHDRAWAL"),
        }
    }
}

/// A deposit into or withdrawal from the portfolio's cash sub-account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashTransaction {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub date: NaiveDate,

    /// Signed amount: positive = deposit, negative = withdrawal
    pub amount: f64,

    #[serde(rename = "type")]
    pub kind: CashTransactionType,
}

impl CashTransaction {
    /// Create a cash transaction from a positive magnitude.
    /// The sign is taken from `kind`.
    pub fn new(date: NaiveDate, magnitude: f64, kind: CashTransactionType) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            amount: magnitude.abs() * kind.sign(),
            kind,
        }
    }

    pub fn deposit(date: NaiveDate, magnitude: f64) -> Self {
        Self::new(date, magnitude, CashTransactionType::Deposit)
    }

    pub fn withdrawal(date: NaiveDate, magnitude: f64) -> Self {
        Self::new(date, magnitude, CashTransactionType::Withdrawal)
    }
}

/// Anything stored in a ledger list that can be addressed by a stable id.
pub trait LedgerEntry: Clone {
    fn id(&self) -> Uuid;
}

impl LedgerEntry for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl LedgerEntry for CashTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}
