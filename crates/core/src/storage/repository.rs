use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::settings::Settings;
use crate::models::transaction::{CashTransaction, Transaction};
use crate::models::watchlist::Watchlist;

use super::traits::KeyValueStore;

pub const TRANSACTIONS_KEY: &str = "portfolio_transactions";
pub const CASH_TRANSACTIONS_KEY: &str = "cash_transactions";
pub const SETTINGS_KEY: &str = "settings";
pub const WATCHLIST_KEY: &str = "watchlist";

/// Load/save the ledger, settings and watchlist as JSON blobs under fixed keys.
///
/// A key that has never been written loads as empty/default.
pub struct LedgerRepository;

impl LedgerRepository {
    /// Load both transaction lists.
    ///
    /// Entries stored before ids existed get one on load; a list that needed
    /// ids is written back so they stay the same on the next load.
    pub async fn load_ledger<S: KeyValueStore + ?Sized>(store: &S) -> Result<Ledger, CoreError> {
        let transactions: Vec<Transaction> = Self::load_entries(store, TRANSACTIONS_KEY).await?;
        let cash_transactions: Vec<CashTransaction> =
            Self::load_entries(store, CASH_TRANSACTIONS_KEY).await?;
        Ok(Ledger {
            transactions,
            cash_transactions,
        })
    }

    pub async fn save_transactions<S: KeyValueStore + ?Sized>(
        store: &S,
        transactions: &[Transaction],
    ) -> Result<(), CoreError> {
        Self::save(store, TRANSACTIONS_KEY, &transactions).await
    }

    pub async fn save_cash_transactions<S: KeyValueStore + ?Sized>(
        store: &S,
        cash_transactions: &[CashTransaction],
    ) -> Result<(), CoreError> {
        Self::save(store, CASH_TRANSACTIONS_KEY, &cash_transactions).await
    }

    pub async fn load_settings<S: KeyValueStore + ?Sized>(store: &S) -> Result<Settings, CoreError> {
        Self::load_or_default(store, SETTINGS_KEY).await
    }

    pub async fn save_settings<S: KeyValueStore + ?Sized>(store: &S, settings: &Settings) -> Result<(), CoreError> {
        Self::save(store, SETTINGS_KEY, settings).await
    }

    pub async fn load_watchlist<S: KeyValueStore + ?Sized>(store: &S) -> Result<Watchlist, CoreError> {
        Self::load_or_default(store, WATCHLIST_KEY).await
    }

    pub async fn save_watchlist<S: KeyValueStore + ?Sized>(store: &S, watchlist: &Watchlist) -> Result<(), CoreError> {
        Self::save(store, WATCHLIST_KEY, watchlist).await
    }

    async fn load_entries<S, T>(store: &S, key: &str) -> Result<Vec<T>, CoreError>
    where
        S: KeyValueStore + ?Sized,
        T: DeserializeOwned + Serialize,
    {
        let raw: Vec<serde_json::Value> = Self::load_or_default(store, key).await?;
        let missing_ids = raw.iter().filter(|v| v.get("id").is_none()).count();
        let entries = raw
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| CoreError::Deserialization(format!("Failed to parse '{key}': {e}")))?;

        if missing_ids > 0 {
            debug!("assigned ids to {missing_ids} legacy entries under '{key}', saving");
            if let Err(e) = Self::save(store, key, &entries).await {
                warn!("could not save assigned ids under '{key}': {e}");
            }
        }
        Ok(entries)
    }

    async fn load_or_default<S, T>(store: &S, key: &str) -> Result<T, CoreError>
    where
        S: KeyValueStore + ?Sized,
        T: DeserializeOwned + Default,
    {
        match store.get(key).await? {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| CoreError::Deserialization(format!("Failed to parse '{key}': {e}"))),
            None => {
                debug!("no stored value under '{key}', using default");
                Ok(T::default())
            }
        }
    }

    async fn save<S, T>(store: &S, key: &str, value: &T) -> Result<(), CoreError>
    where
        S: KeyValueStore + ?Sized,
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{key}': {e}")))?;
        store.set(key, &json).await
    }
}
