pub mod holdings_service;
pub mod ledger_service;
pub mod quote_service;
pub mod validation_service;
pub mod valuation_service;
