// ═══════════════════════════════════════════════════════════════════
// Storage Tests — MemoryStore against the PortfolioStore contract
// ═══════════════════════════════════════════════════════════════════

use cryptofolio_core::models::holding::Holding;
use cryptofolio_core::models::portfolio::Portfolio;
use cryptofolio_core::storage::memory::MemoryStore;
use cryptofolio_core::storage::traits::PortfolioStore;

fn holding(symbol: &str) -> Holding {
    Holding::new(symbol, 1.0, 100.0, None, None)
}

mod find_one {
    use super::*;

    #[tokio::test]
    async fn missing_user_reads_as_none() {
        let store = MemoryStore::new();
        assert!(store.find_one("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_does_not_create_a_document() {
        let store = MemoryStore::new();
        let _ = store.find_one("nobody").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn returns_a_detached_copy() {
        let store = MemoryStore::new();
        store.upsert_items("user-1", vec![holding("BTC")]).await.unwrap();

        let mut copy = store.find_one("user-1").await.unwrap().unwrap();
        copy.items.clear();

        // Mutating the copy never leaks into the store without a save.
        let fresh = store.find_one("user-1").await.unwrap().unwrap();
        assert_eq!(fresh.items.len(), 1);
    }
}

mod upsert_items {
    use super::*;

    #[tokio::test]
    async fn creates_document_when_absent() {
        let store = MemoryStore::new();
        let doc = store.upsert_items("user-1", vec![holding("BTC")]).await.unwrap();
        assert_eq!(doc.user_id, "user-1");
        assert_eq!(doc.items.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn overwrites_existing_items() {
        let store = MemoryStore::new();
        store
            .upsert_items("user-1", vec![holding("BTC"), holding("ETH")])
            .await
            .unwrap();
        let doc = store.upsert_items("user-1", vec![holding("DOGE")]).await.unwrap();
        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.items[0].symbol, "DOGE");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn refreshes_document_updated_at() {
        let store = MemoryStore::new();
        let first = store.upsert_items("user-1", vec![]).await.unwrap();
        let second = store.upsert_items("user-1", vec![holding("BTC")]).await.unwrap();
        assert!(second.updated_at >= first.updated_at);
    }
}

mod save {
    use super::*;

    #[tokio::test]
    async fn persists_whole_document() {
        let store = MemoryStore::new();
        let mut portfolio = Portfolio::new("user-1");
        portfolio.items.push(holding("BTC"));
        store.save(&portfolio).await.unwrap();

        let loaded = store.find_one("user-1").await.unwrap().unwrap();
        assert_eq!(loaded, portfolio);
    }

    #[tokio::test]
    async fn save_replaces_previous_state() {
        let store = MemoryStore::new();
        let mut portfolio = Portfolio::new("user-1");
        portfolio.items.push(holding("BTC"));
        store.save(&portfolio).await.unwrap();

        portfolio.items.clear();
        store.save(&portfolio).await.unwrap();

        let loaded = store.find_one("user-1").await.unwrap().unwrap();
        assert!(loaded.items.is_empty());
    }

    #[tokio::test]
    async fn documents_are_independent_per_user() {
        let store = MemoryStore::new();
        store.save(&Portfolio::new("user-1")).await.unwrap();
        store.save(&Portfolio::new("user-2")).await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.find_one("user-1").await.unwrap().is_some());
        assert!(store.find_one("user-2").await.unwrap().is_some());
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn removes_the_document() {
        let store = MemoryStore::new();
        store.save(&Portfolio::new("user-1")).await.unwrap();
        assert!(store.delete("user-1").await.unwrap());
        assert!(store.find_one("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_document_reports_false() {
        let store = MemoryStore::new();
        assert!(!store.delete("nobody").await.unwrap());
    }
}
