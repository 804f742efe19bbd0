#[cfg(not(target_arch = "wasm32"))]
pub mod file;
pub mod memory;
pub mod repository;
pub mod traits;
