// ═══════════════════════════════════════════════════════════════════
// Storage Tests: MemoryStore, FileStore, key rules, LedgerRepository
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use portfolio_ledger_core::errors::CoreError;
use portfolio_ledger_core::models::ledger::Ledger;
use portfolio_ledger_core::models::settings::Settings;
use portfolio_ledger_core::models::transaction::{CashTransaction, Transaction};
use portfolio_ledger_core::models::watchlist::Watchlist;
use portfolio_ledger_core::storage::file::FileStore;
use portfolio_ledger_core::storage::memory::MemoryStore;
use portfolio_ledger_core::storage::repository::{
    LedgerRepository, CASH_TRANSACTIONS_KEY, SETTINGS_KEY, TRANSACTIONS_KEY, WATCHLIST_KEY,
};
use portfolio_ledger_core::storage::traits::{validate_key, KeyValueStore};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sample_ledger() -> Ledger {
    Ledger {
        transactions: vec![
            Transaction::new("AAPL", d(2025, 1, 15), 10.0, 187.5),
            Transaction::new("MSFT", d(2025, 2, 3), -2.0, 410.25),
        ],
        cash_transactions: vec![
            CashTransaction::deposit(d(2025, 1, 1), 5000.0),
            CashTransaction::withdrawal(d(2025, 3, 1), 250.0),
        ],
    }
}

async fn save_both<S: KeyValueStore>(store: &S, ledger: &Ledger) {
    LedgerRepository::save_transactions(store, &ledger.transactions)
        .await
        .unwrap();
    LedgerRepository::save_cash_transactions(store, &ledger.cash_transactions)
        .await
        .unwrap();
}

// ── Key rules ───────────────────────────────────────────────────────

mod keys {
    use super::*;

    #[test]
    fn accepted_keys() {
        for key in [TRANSACTIONS_KEY, CASH_TRANSACTIONS_KEY, SETTINGS_KEY, WATCHLIST_KEY, "a-1_B"] {
            assert!(validate_key(key).is_ok(), "{key}");
        }
    }

    #[test]
    fn rejected_keys() {
        for key in ["", "../etc/passwd", "with space", "dot.json", "slash/key"] {
            assert!(
                matches!(validate_key(key), Err(CoreError::Storage(_))),
                "{key:?} should be rejected"
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
//  MemoryStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nothing").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn set_get_overwrite_remove() {
        let store = MemoryStore::new();
        store.set("k", "one").await.unwrap();
        store.set("k", "two").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set("shared", "yes").await.unwrap();
        assert_eq!(b.get("shared").await.unwrap().as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn invalid_key_rejected() {
        let store = MemoryStore::new();
        assert!(store.set("bad key", "x").await.is_err());
        assert!(store.get("").await.is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  FileStore
// ═══════════════════════════════════════════════════════════════════

mod file_store {
    use super::*;

    #[tokio::test]
    async fn creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("ledger");
        let store = FileStore::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn each_key_is_a_json_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();
        store.set("watchlist", r#"{"symbols":[]}"#).await.unwrap();

        let path = tmp.path().join("watchlist.json");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"symbols":[]}"#);
        assert!(!tmp.path().join("watchlist.json.tmp").exists());
    }

    #[tokio::test]
    async fn missing_file_is_none_and_remove_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();
        assert_eq!(store.get("absent").await.unwrap(), None);
        store.remove("absent").await.unwrap();

        store.set("present", "1").await.unwrap();
        store.remove("present").await.unwrap();
        assert_eq!(store.get("present").await.unwrap(), None);
    }

    #[tokio::test]
    async fn path_traversal_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();
        assert!(matches!(
            store.set("../escape", "x").await,
            Err(CoreError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = sample_ledger();
        {
            let store = FileStore::open(tmp.path()).await.unwrap();
            save_both(&store, &ledger).await;
        }
        let store = FileStore::open(tmp.path()).await.unwrap();
        assert_eq!(LedgerRepository::load_ledger(&store).await.unwrap(), ledger);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  LedgerRepository
// ═══════════════════════════════════════════════════════════════════

mod repository {
    use super::*;

    #[tokio::test]
    async fn empty_store_loads_defaults() {
        let store = MemoryStore::new();
        assert!(LedgerRepository::load_ledger(&store).await.unwrap().is_empty());
        assert_eq!(
            LedgerRepository::load_settings(&store).await.unwrap(),
            Settings::default()
        );
        assert_eq!(
            LedgerRepository::load_watchlist(&store).await.unwrap(),
            Watchlist::default()
        );
    }

    #[tokio::test]
    async fn ledger_roundtrip_keeps_order_and_ids() {
        let store = MemoryStore::new();
        let ledger = sample_ledger();
        save_both(&store, &ledger).await;
        assert_eq!(LedgerRepository::load_ledger(&store).await.unwrap(), ledger);
    }

    #[tokio::test]
    async fn lists_are_stored_under_separate_keys() {
        let store = MemoryStore::new();
        let ledger = sample_ledger();
        LedgerRepository::save_transactions(&store, &ledger.transactions)
            .await
            .unwrap();
        assert!(store.get(TRANSACTIONS_KEY).await.unwrap().is_some());
        assert!(store.get(CASH_TRANSACTIONS_KEY).await.unwrap().is_none());

        let loaded = LedgerRepository::load_ledger(&store).await.unwrap();
        assert_eq!(loaded.transactions, ledger.transactions);
        assert!(loaded.cash_transactions.is_empty());
    }

    #[tokio::test]
    async fn stored_blob_uses_plain_field_names() {
        let store = MemoryStore::new();
        LedgerRepository::save_cash_transactions(&store, &sample_ledger().cash_transactions)
            .await
            .unwrap();
        let raw = store.get(CASH_TRANSACTIONS_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["type"], "DEPOSIT");
        assert_eq!(value[1]["type"], "WITHDRAWAL");
        assert_eq!(value[1]["amount"], -250.0);
        assert_eq!(value[0]["date"], "2025-01-01");
    }

    #[tokio::test]
    async fn settings_and_watchlist_roundtrip() {
        let store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.quote_ttl_seconds = 5;
        settings.api_keys.insert("finnhub".into(), "k".into());
        let mut watchlist = Watchlist::empty();
        watchlist.add("tsla");

        LedgerRepository::save_settings(&store, &settings).await.unwrap();
        LedgerRepository::save_watchlist(&store, &watchlist).await.unwrap();

        assert_eq!(LedgerRepository::load_settings(&store).await.unwrap(), settings);
        assert_eq!(LedgerRepository::load_watchlist(&store).await.unwrap(), watchlist);
    }

    #[tokio::test]
    async fn ids_assigned_to_old_entries_are_saved() {
        let store = MemoryStore::new();
        store
            .set(
                TRANSACTIONS_KEY,
                r#"[{"ticker":"AAPL","date":"2025-01-15","shares":10,"price":100}]"#,
            )
            .await
            .unwrap();
        store
            .set(
                CASH_TRANSACTIONS_KEY,
                r#"[{"date":"2025-01-01","amount":500,"type":"DEPOSIT"}]"#,
            )
            .await
            .unwrap();

        let first = LedgerRepository::load_ledger(&store).await.unwrap();
        let second = LedgerRepository::load_ledger(&store).await.unwrap();
        assert_eq!(first.transactions[0].id, second.transactions[0].id);
        assert_eq!(first.cash_transactions[0].id, second.cash_transactions[0].id);

        let raw = store.get(TRANSACTIONS_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], first.transactions[0].id.to_string());
    }

    #[tokio::test]
    async fn loading_never_creates_missing_keys() {
        let store = MemoryStore::new();
        LedgerRepository::load_ledger(&store).await.unwrap();
        assert!(store.get(TRANSACTIONS_KEY).await.unwrap().is_none());
        assert!(store.get(CASH_TRANSACTIONS_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn complete_lists_are_not_rewritten() {
        let store = MemoryStore::new();
        let ledger = sample_ledger();
        save_both(&store, &ledger).await;
        let compact = r#"[ ]"#;
        store.set(CASH_TRANSACTIONS_KEY, compact).await.unwrap();

        LedgerRepository::load_ledger(&store).await.unwrap();
        assert_eq!(
            store.get(CASH_TRANSACTIONS_KEY).await.unwrap().as_deref(),
            Some(compact)
        );
    }

    #[tokio::test]
    async fn corrupt_blob_is_a_deserialization_error() {
        let store = MemoryStore::new();
        store.set(WATCHLIST_KEY, "[[[").await.unwrap();
        let err = LedgerRepository::load_watchlist(&store).await.unwrap_err();
        match err {
            CoreError::Deserialization(msg) => assert!(msg.contains("watchlist")),
            other => panic!("expected Deserialization, got {other:?}"),
        }
    }
}
