pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::Utc;
use log::{debug, error};
use models::{
    history::{PriceHistory, SymbolMatch, Timeframe},
    holding::Holding,
    ledger::Ledger,
    quote::{QuoteCache, QuoteMap},
    settings::Settings,
    transaction::{CashTransaction, CashTransactionType, LedgerEntry, Transaction},
    valuation::PortfolioValuation,
    watchlist::Watchlist,
};
use providers::registry::QuoteProviderRegistry;
use services::{
    holdings_service::HoldingsService, ledger_service::LedgerService,
    quote_service::QuoteService, validation_service::ValidationService,
    valuation_service::ValuationService,
};
use std::collections::HashSet;
use std::time::Duration;
use storage::{repository::LedgerRepository, traits::KeyValueStore};
use tokio::sync::watch;
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the portfolio ledger core library.
///
/// Owns the one in-memory copy of the ledger. Every screen reads holdings and
/// valuations from here and can [`subscribe`](Self::subscribe) to be told
/// when the ledger changes.
#[must_use]
pub struct PortfolioTracker<S: KeyValueStore> {
    store: S,
    ledger: Ledger,
    settings: Settings,
    watchlist: Watchlist,
    /// Most recent quote per symbol, pruned to held and watched symbols on refresh.
    quotes: QuoteMap,
    quote_cache: QuoteCache,
    quote_service: QuoteService,
    validation_service: ValidationService,
    holdings_service: HoldingsService,
    valuation_service: ValuationService,
    ledger_service: LedgerService,
    updates: watch::Sender<Ledger>,
}

impl<S: KeyValueStore> std::fmt::Debug for PortfolioTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("transactions", &self.ledger.transactions.len())
            .field("cash_transactions", &self.ledger.cash_transactions.len())
            .field("settings", &self.settings)
            .field("watchlist", &self.watchlist.len())
            .field("quotes", &self.quotes.len())
            .finish()
    }
}

impl<S: KeyValueStore> PortfolioTracker<S> {
    /// Load ledger, settings and watchlist from `store` and build the default
    /// quote providers from the stored API keys.
    pub async fn open(store: S) -> Result<Self, CoreError> {
        let settings = LedgerRepository::load_settings(&store).await?;
        let registry = Self::default_registry(&settings);
        Self::with_settings(store, settings, registry).await
    }

    /// Like [`open`](Self::open) but with a caller-supplied provider registry.
    pub async fn open_with_registry(
        store: S,
        registry: QuoteProviderRegistry,
    ) -> Result<Self, CoreError> {
        let settings = LedgerRepository::load_settings(&store).await?;
        Self::with_settings(store, settings, registry).await
    }

    async fn with_settings(
        store: S,
        settings: Settings,
        registry: QuoteProviderRegistry,
    ) -> Result<Self, CoreError> {
        let ledger = LedgerRepository::load_ledger(&store).await?;
        let watchlist = LedgerRepository::load_watchlist(&store).await?;
        debug!(
            "opened ledger with {} trades and {} cash entries",
            ledger.transactions.len(),
            ledger.cash_transactions.len()
        );

        let (updates, _) = watch::channel(ledger.clone());
        Ok(Self {
            store,
            ledger,
            settings,
            watchlist,
            quotes: QuoteMap::new(),
            quote_cache: QuoteCache::new(),
            quote_service: QuoteService::new(registry),
            validation_service: ValidationService::new(),
            holdings_service: HoldingsService::new(),
            valuation_service: ValuationService::new(),
            ledger_service: LedgerService::new(),
            updates,
        })
    }

    // ── Change notification ─────────────────────────────────────────

    /// Receive the ledger after every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Ledger> {
        self.updates.subscribe()
    }

    // ── Trades ──────────────────────────────────────────────────────

    /// Validate the "add transaction" form, append and persist it.
    /// On any error the ledger is left untouched.
    pub async fn add_trade(
        &mut self,
        ticker: &str,
        date: &str,
        shares: &str,
        price: &str,
    ) -> Result<Uuid, CoreError> {
        let tx = self
            .validation_service
            .validate_trade_input(ticker, date, shares, price)?;
        let id = tx.id;
        let next = self.ledger_service.add_entry(&self.ledger.transactions, tx);
        self.commit_transactions(next).await?;
        Ok(id)
    }

    /// Delete the trade shown at `display_index` in the newest-first list.
    pub async fn delete_trade_at(&mut self, display_index: usize) -> Result<Transaction, CoreError> {
        let removed = self
            .ledger_service
            .displayed_entry(&self.ledger.transactions, display_index)?
            .clone();
        let next = self
            .ledger_service
            .delete_displayed(&self.ledger.transactions, display_index)?;
        self.commit_transactions(next).await?;
        Ok(removed)
    }

    /// Delete a trade by its id.
    pub async fn delete_trade(&mut self, id: Uuid) -> Result<Transaction, CoreError> {
        let removed = find_entry(&self.ledger.transactions, id)?;
        let next = self
            .ledger_service
            .delete_by_id(&self.ledger.transactions, id)?;
        self.commit_transactions(next).await?;
        Ok(removed)
    }

    /// Trades in storage (insertion) order.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.ledger.transactions
    }

    /// Trades newest-first, as displayed.
    #[must_use]
    pub fn trades_for_display(&self) -> Vec<&Transaction> {
        self.ledger_service.display_order(&self.ledger.transactions)
    }

    // ── Cash ────────────────────────────────────────────────────────

    /// Validate the cash form, append and persist it.
    /// `amount` is a positive magnitude; `kind` decides the sign.
    pub async fn add_cash(
        &mut self,
        date: &str,
        amount: &str,
        kind: CashTransactionType,
    ) -> Result<Uuid, CoreError> {
        let cash = self
            .validation_service
            .validate_cash_transaction(date, amount, kind)?;
        let id = cash.id;
        let next = self
            .ledger_service
            .add_entry(&self.ledger.cash_transactions, cash);
        self.commit_cash(next).await?;
        Ok(id)
    }

    /// Delete the cash entry shown at `display_index` in the newest-first list.
    pub async fn delete_cash_at(
        &mut self,
        display_index: usize,
    ) -> Result<CashTransaction, CoreError> {
        let removed = self
            .ledger_service
            .displayed_entry(&self.ledger.cash_transactions, display_index)?
            .clone();
        let next = self
            .ledger_service
            .delete_displayed(&self.ledger.cash_transactions, display_index)?;
        self.commit_cash(next).await?;
        Ok(removed)
    }

    /// Delete a cash entry by its id.
    pub async fn delete_cash(&mut self, id: Uuid) -> Result<CashTransaction, CoreError> {
        let removed = find_entry(&self.ledger.cash_transactions, id)?;
        let next = self
            .ledger_service
            .delete_by_id(&self.ledger.cash_transactions, id)?;
        self.commit_cash(next).await?;
        Ok(removed)
    }

    #[must_use]
    pub fn cash_transactions(&self) -> &[CashTransaction] {
        &self.ledger.cash_transactions
    }

    #[must_use]
    pub fn cash_for_display(&self) -> Vec<&CashTransaction> {
        self.ledger_service
            .display_order(&self.ledger.cash_transactions)
    }

    #[must_use]
    pub fn cash_balance(&self) -> f64 {
        self.holdings_service
            .cash_balance(&self.ledger.cash_transactions)
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ── Holdings & Valuation ────────────────────────────────────────

    /// Current holdings derived from the ledger.
    #[must_use]
    pub fn holdings(&self) -> Vec<Holding> {
        self.holdings_service
            .aggregate_holdings(&self.ledger.transactions, &self.ledger.cash_transactions)
    }

    /// Value the current holdings with the most recent quotes.
    ///
    /// Always uses the latest ledger and the latest quotes, whichever of the
    /// two changed last.
    #[must_use]
    pub fn valuation(&self) -> PortfolioValuation {
        self.valuation_service
            .value_holdings(&self.holdings(), &self.quotes)
    }

    // ── Quotes ──────────────────────────────────────────────────────

    /// Latest known quote per symbol.
    #[must_use]
    pub fn quotes(&self) -> &QuoteMap {
        &self.quotes
    }

    /// Merge externally obtained quotes (e.g. from a push feed).
    pub fn apply_quotes(&mut self, quotes: QuoteMap) {
        self.quotes.extend(quotes);
    }

    /// Fetch quotes for every instrument currently held.
    /// Returns how many symbols received a quote.
    ///
    /// A held symbol no provider could price loses its previous quote and is
    /// valued at zero until a later refresh succeeds.
    pub async fn refresh_quotes(&mut self) -> Result<usize, CoreError> {
        let symbols = self.holdings_service.instrument_tickers(&self.holdings());
        let fetched = self.fetch_quotes(&symbols).await?;
        Ok(fetched.len())
    }

    /// Fetch quotes for every watchlist symbol.
    pub async fn refresh_watchlist_quotes(&mut self) -> Result<QuoteMap, CoreError> {
        let symbols = self.watchlist.symbols.clone();
        self.fetch_quotes(&symbols).await
    }

    #[must_use]
    pub fn quote_provider_names(&self) -> Vec<String> {
        self.quote_service.provider_names()
    }

    /// Chart data for one symbol over `timeframe`.
    pub async fn price_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<PriceHistory, CoreError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::MissingField("symbol".into()));
        }
        self.quote_service.get_history(&symbol, timeframe).await
    }

    /// Look up tradable symbols for the "add to watchlist" box.
    pub async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        self.quote_service.search_symbols(query).await
    }

    // ── Watchlist ───────────────────────────────────────────────────

    #[must_use]
    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// Add a symbol to the watchlist. Returns `false` if nothing changed.
    pub async fn add_to_watchlist(&mut self, symbol: &str) -> Result<bool, CoreError> {
        let mut next = self.watchlist.clone();
        if !next.add(symbol) {
            return Ok(false);
        }
        LedgerRepository::save_watchlist(&self.store, &next).await?;
        self.watchlist = next;
        Ok(true)
    }

    /// Remove a symbol from the watchlist. Returns `false` if it was absent.
    pub async fn remove_from_watchlist(&mut self, symbol: &str) -> Result<bool, CoreError> {
        let mut next = self.watchlist.clone();
        if !next.remove(symbol) {
            return Ok(false);
        }
        LedgerRepository::save_watchlist(&self.store, &next).await?;
        self.watchlist = next;
        Ok(true)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change how long fetched quotes are reused.
    pub async fn set_quote_ttl_seconds(&mut self, seconds: u64) -> Result<(), CoreError> {
        let mut next = self.settings.clone();
        next.quote_ttl_seconds = seconds;
        self.commit_settings(next).await
    }

    /// Set an API key for a provider (e.g., "finnhub").
    /// Rebuilds the provider registry so the new key takes effect immediately.
    pub async fn set_api_key(&mut self, provider: &str, key: &str) -> Result<(), CoreError> {
        let mut next = self.settings.clone();
        next.api_keys.insert(provider.to_string(), key.to_string());
        self.commit_settings(next).await?;
        self.quote_service = QuoteService::new(Self::default_registry(&self.settings));
        Ok(())
    }

    /// Remove an API key for a provider. Returns `false` if none was set.
    pub async fn remove_api_key(&mut self, provider: &str) -> Result<bool, CoreError> {
        if !self.settings.api_keys.contains_key(provider) {
            return Ok(false);
        }
        let mut next = self.settings.clone();
        next.api_keys.remove(provider);
        self.commit_settings(next).await?;
        self.quote_service = QuoteService::new(Self::default_registry(&self.settings));
        Ok(true)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export both transaction lists as a JSON string.
    pub fn export_ledger_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))
    }

    /// Append the entries of an exported ledger.
    ///
    /// Every entry is checked first; if any is invalid nothing is imported.
    /// Entries whose id already exists get a fresh id. Only the lists that
    /// grow are written, and a failed write leaves both stored lists as they were.
    /// Returns the number of entries imported.
    pub async fn import_ledger_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let imported: Ledger = serde_json::from_str(json)?;
        for tx in &imported.transactions {
            self.validation_service.check_transaction(tx)?;
        }
        for cash in &imported.cash_transactions {
            self.validation_service.check_cash_transaction(cash)?;
        }

        let count = imported.transactions.len() + imported.cash_transactions.len();
        if count == 0 {
            return Ok(0);
        }
        let trades_changed = !imported.transactions.is_empty();
        let cash_changed = !imported.cash_transactions.is_empty();
        let mut next = self.ledger.clone();
        append_with_fresh_ids(&mut next.transactions, imported.transactions, |t, id| t.id = id);
        append_with_fresh_ids(&mut next.cash_transactions, imported.cash_transactions, |c, id| {
            c.id = id
        });

        if trades_changed {
            LedgerRepository::save_transactions(&self.store, &next.transactions).await?;
        }
        if cash_changed {
            if let Err(e) =
                LedgerRepository::save_cash_transactions(&self.store, &next.cash_transactions).await
            {
                if trades_changed {
                    self.restore_transactions().await;
                }
                return Err(e);
            }
        }

        self.ledger = next;
        self.publish();
        Ok(count)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn default_registry(settings: &Settings) -> QuoteProviderRegistry {
        QuoteProviderRegistry::new_with_defaults(
            &settings.api_keys,
            Duration::from_secs(settings.request_timeout_seconds),
        )
    }

    async fn fetch_quotes(&mut self, symbols: &[String]) -> Result<QuoteMap, CoreError> {
        if symbols.is_empty() {
            return Ok(QuoteMap::new());
        }
        if !self.quote_service.has_providers() {
            return Err(CoreError::NoProvider(symbols.join(", ")));
        }
        let now = Utc::now();
        let ttl = self.settings.quote_ttl();
        let pruned = self.quote_cache.prune_expired(now, ttl);
        if pruned > 0 {
            debug!("dropped {pruned} expired cached quotes");
        }
        let fetched = self
            .quote_service
            .get_quotes(&mut self.quote_cache, symbols, now, ttl)
            .await;

        for symbol in symbols {
            match fetched.get(symbol) {
                Some(quote) => {
                    self.quotes.insert(symbol.clone(), *quote);
                }
                None => {
                    self.quotes.remove(symbol);
                }
            }
        }
        self.prune_quotes();
        Ok(fetched)
    }

    /// Keep quotes only for symbols still held or watched.
    fn prune_quotes(&mut self) {
        let held = self.holdings_service.instrument_tickers(&self.holdings());
        let watchlist = &self.watchlist;
        let before = self.quotes.len();
        self.quotes
            .retain(|symbol, _| held.contains(symbol) || watchlist.contains(symbol));
        let dropped = before - self.quotes.len();
        if dropped > 0 {
            debug!("dropped {dropped} quotes for symbols no longer tracked");
        }
    }

    /// Put the stored trade list back to the in-memory one after a partial write.
    async fn restore_transactions(&self) {
        if let Err(e) =
            LedgerRepository::save_transactions(&self.store, &self.ledger.transactions).await
        {
            error!("failed to restore trades after an aborted import: {e}");
        }
    }

    async fn commit_transactions(&mut self, next: Vec<Transaction>) -> Result<(), CoreError> {
        LedgerRepository::save_transactions(&self.store, &next).await?;
        self.ledger.transactions = next;
        self.publish();
        Ok(())
    }

    async fn commit_cash(&mut self, next: Vec<CashTransaction>) -> Result<(), CoreError> {
        LedgerRepository::save_cash_transactions(&self.store, &next).await?;
        self.ledger.cash_transactions = next;
        self.publish();
        Ok(())
    }

    async fn commit_settings(&mut self, next: Settings) -> Result<(), CoreError> {
        LedgerRepository::save_settings(&self.store, &next).await?;
        self.settings = next;
        Ok(())
    }

    fn publish(&self) {
        self.updates.send_replace(self.ledger.clone());
    }
}

fn find_entry<T: LedgerEntry>(log: &[T], id: Uuid) -> Result<T, CoreError> {
    log.iter()
        .find(|e| e.id() == id)
        .cloned()
        .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))
}

fn append_with_fresh_ids<T: LedgerEntry>(
    target: &mut Vec<T>,
    incoming: Vec<T>,
    set_id: impl Fn(&mut T, Uuid),
) {
    let mut seen: HashSet<Uuid> = target.iter().map(|e| e.id()).collect();
    for mut entry in incoming {
        if !seen.insert(entry.id()) {
            let fresh = Uuid::new_v4();
            set_id(&mut entry, fresh);
            seen.insert(fresh);
        }
        target.push(entry);
    }
}
