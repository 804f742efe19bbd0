pub mod registry;
pub mod traits;

// API provider implementations
pub mod finnhub;
#[cfg(not(target_arch = "wasm32"))]
pub mod yahoo_finance;
