use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::transaction::{CashTransaction, CashTransactionType, Transaction};

/// Gatekeeper for raw form input. Nothing enters the ledger without
/// passing through here, so aggregation never has to handle bad numbers.
pub struct ValidationService;

impl ValidationService {
    pub fn new() -> Self {
        Self
    }

    /// Validate the "add transaction" form and build a [`Transaction`].
    ///
    /// - any empty field → `MissingField`
    /// - `shares` or `price` not a finite number → `NotANumber`
    /// - unparseable date → `InvalidDate`
    /// - zero shares or negative price → `InvalidAmount`
    ///
    /// The ticker is trimmed and uppercased. Magnitudes are otherwise unbounded.
    pub fn validate_trade_input(
        &self,
        ticker: &str,
        date: &str,
        shares: &str,
        price: &str,
    ) -> Result<Transaction, CoreError> {
        let ticker = required("ticker", ticker)?;
        let date = required("date", date)?;
        let shares = required("shares", shares)?;
        let price = required("price", price)?;

        let shares = parse_number("shares", shares)?;
        let price = parse_number("price", price)?;
        let date = parse_date(date)?;

        if shares == 0.0 {
            return Err(CoreError::InvalidAmount(
                "Shares must be nonzero".into(),
            ));
        }
        if price < 0.0 {
            return Err(CoreError::InvalidAmount(format!(
                "Price must not be negative (got {price})"
            )));
        }

        Ok(Transaction::new(ticker, date, shares, price))
    }

    /// Validate the cash amount field. Returns the positive magnitude;
    /// the sign is applied from the deposit/withdrawal selector.
    pub fn validate_cash_input(&self, amount: &str) -> Result<f64, CoreError> {
        let amount = required("amount", amount)?;
        let value: f64 = amount.parse().map_err(|_| {
            CoreError::InvalidAmount(format!("'{amount}' is not a number"))
        })?;
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::InvalidAmount(
                "Amount must be a positive number".into(),
            ));
        }
        Ok(value)
    }

    /// Validate a full cash form (date + amount + type) and build the entry.
    pub fn validate_cash_transaction(
        &self,
        date: &str,
        amount: &str,
        kind: CashTransactionType,
    ) -> Result<CashTransaction, CoreError> {
        let magnitude = self.validate_cash_input(amount)?;
        let date = parse_date(required("date", date)?)?;
        Ok(CashTransaction::new(date, magnitude, kind))
    }

    /// Check an already-built trade, e.g. one arriving from an import.
    pub fn check_transaction(&self, tx: &Transaction) -> Result<(), CoreError> {
        if tx.ticker.trim().is_empty() {
            return Err(CoreError::MissingField("ticker".into()));
        }
        if tx.ticker != tx.ticker.trim().to_uppercase() {
            return Err(CoreError::InvalidAmount(format!(
                "Ticker '{}' is not normalized",
                tx.ticker
            )));
        }
        finite("shares", tx.shares)?;
        finite("price", tx.price)?;
        if tx.shares == 0.0 || tx.price < 0.0 {
            return Err(CoreError::InvalidAmount(format!(
                "Invalid trade {} {} @ {}",
                tx.ticker, tx.shares, tx.price
            )));
        }
        Ok(())
    }

    /// Check an already-built cash entry: finite, nonzero, sign matching its type.
    pub fn check_cash_transaction(&self, cash: &CashTransaction) -> Result<(), CoreError> {
        finite("amount", cash.amount)?;
        if cash.amount == 0.0 || cash.amount.signum() != cash.kind.sign() {
            return Err(CoreError::InvalidAmount(format!(
                "{} of {} has the wrong sign",
                cash.kind, cash.amount
            )));
        }
        Ok(())
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new()
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingField(field.to_string()));
    }
    Ok(trimmed)
}

fn parse_number(field: &str, value: &str) -> Result<f64, CoreError> {
    let not_a_number = || CoreError::NotANumber {
        field: field.to_string(),
        value: value.to_string(),
    };
    let parsed: f64 = value.parse().map_err(|_| not_a_number())?;
    if !parsed.is_finite() {
        return Err(not_a_number());
    }
    Ok(parsed)
}

fn finite(field: &str, value: f64) -> Result<(), CoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::NotANumber {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(value.to_string()))
}
