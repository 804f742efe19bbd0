pub mod history;
pub mod holding;
pub mod ledger;
pub mod quote;
pub mod settings;
pub mod transaction;
pub mod valuation;
pub mod watchlist;
