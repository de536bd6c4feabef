pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use uuid::Uuid;

use errors::CoreError;
use models::holding::{Holding, HoldingInput, HoldingPatch};
use models::portfolio::{Portfolio, MAX_ITEMS};
use services::reconciler::PortfolioReconciler;
use storage::memory::MemoryStore;
use storage::traits::PortfolioStore;

/// Main entry point for the cryptofolio core library.
///
/// Owns the persistence backend and the reconciliation rules, and exposes
/// the per-user portfolio operations the HTTP layer calls into. Every
/// operation is a short-lived read-modify-write against one user's document;
/// concurrency safety per user is whatever single-document atomicity the
/// backend provides (two concurrent writers to the same user can race —
/// see `storage::traits::PortfolioStore`).
#[must_use]
pub struct PortfolioTracker {
    store: Box<dyn PortfolioStore>,
    reconciler: PortfolioReconciler,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker").finish_non_exhaustive()
    }
}

impl PortfolioTracker {
    /// Create a tracker over any persistence backend.
    pub fn new(store: Box<dyn PortfolioStore>) -> Self {
        Self {
            store,
            reconciler: PortfolioReconciler::new(),
        }
    }

    /// Create a tracker backed by the in-memory store (tests, demos).
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    // ── Read ────────────────────────────────────────────────────────

    /// Get a user's holdings as stored. A user with no portfolio document
    /// reads as an empty list; the document is never created by a read.
    pub async fn get_items(&self, user_id: &str) -> Result<Vec<Holding>, CoreError> {
        let portfolio = self.find(user_id).await?;
        Ok(portfolio.map(|p| p.items).unwrap_or_default())
    }

    /// Number of holdings in a user's portfolio.
    pub async fn item_count(&self, user_id: &str) -> Result<usize, CoreError> {
        let portfolio = self.find(user_id).await?;
        Ok(portfolio.map(|p| p.items.len()).unwrap_or(0))
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Replace a user's entire holding list (full overwrite, not a merge).
    ///
    /// The candidate list is capped at 2000 entries before de-duplication;
    /// an oversized list is rejected with no write. Candidates are then
    /// normalized and de-duplicated (first occurrence of a symbol wins) and
    /// stored atomically via upsert. Idempotent: replacing twice with the
    /// same input yields the same stored state.
    pub async fn replace_items(
        &self,
        user_id: &str,
        candidates: Vec<HoldingInput>,
    ) -> Result<Vec<Holding>, CoreError> {
        if candidates.len() > MAX_ITEMS {
            return Err(CoreError::LimitExceeded {
                count: candidates.len(),
                limit: MAX_ITEMS,
            });
        }

        let items = self.reconciler.build_replacement(candidates);
        let stored = self.store.upsert_items(user_id, items).await.map_err(|e| {
            log::error!("portfolio replace failed for user {user_id}: {e}");
            e
        })?;
        log::debug!(
            "replaced portfolio of user {user_id}: {} items",
            stored.items.len()
        );
        Ok(stored.items)
    }

    /// Add one new holding. Fails with `SymbolExists` if the symbol is
    /// already held — add never merges, unlike `import_items`. Creates the
    /// portfolio document on first use.
    pub async fn add_item(
        &self,
        user_id: &str,
        candidate: HoldingInput,
    ) -> Result<Holding, CoreError> {
        let mut portfolio = self.find_or_new(user_id).await?;
        let id = self.reconciler.add(&mut portfolio, candidate)?;
        self.persist(&mut portfolio).await?;
        // The holding was appended above, so the lookup cannot miss.
        portfolio
            .item(id)
            .cloned()
            .ok_or_else(|| CoreError::HoldingNotFound(id.to_string()))
    }

    /// Update one holding by its identifier. Only supplied fields change.
    pub async fn update_item(
        &self,
        user_id: &str,
        item_id: Uuid,
        patch: HoldingPatch,
    ) -> Result<Holding, CoreError> {
        let mut portfolio = self
            .find(user_id)
            .await?
            .ok_or_else(|| CoreError::PortfolioNotFound(user_id.to_string()))?;
        self.reconciler.apply_patch(&mut portfolio, item_id, patch)?;
        self.persist(&mut portfolio).await?;
        portfolio
            .item(item_id)
            .cloned()
            .ok_or_else(|| CoreError::HoldingNotFound(item_id.to_string()))
    }

    /// Delete one holding by its identifier. Other holdings keep their
    /// identifiers and order.
    pub async fn delete_item(&self, user_id: &str, item_id: Uuid) -> Result<(), CoreError> {
        let mut portfolio = self
            .find(user_id)
            .await?
            .ok_or_else(|| CoreError::PortfolioNotFound(user_id.to_string()))?;
        self.reconciler.remove(&mut portfolio, item_id)?;
        self.persist(&mut portfolio).await
    }

    /// Import a batch of candidates, merging duplicates into existing
    /// holdings by quantity-weighted average cost. Duplicates within the
    /// batch are meaningful and merge too, unlike `replace_items`. The
    /// 2000-item cap is checked once against the post-merge count; on
    /// overflow nothing is persisted. Creates the portfolio document on
    /// first use.
    pub async fn import_items(
        &self,
        user_id: &str,
        candidates: Vec<HoldingInput>,
    ) -> Result<Vec<Holding>, CoreError> {
        let count = candidates.len();
        let mut portfolio = self.find_or_new(user_id).await?;
        self.reconciler.import(&mut portfolio, candidates)?;
        self.persist(&mut portfolio).await?;
        log::debug!(
            "imported {count} candidates for user {user_id}: {} items total",
            portfolio.items.len()
        );
        Ok(portfolio.items)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export a user's holdings as a JSON string.
    pub async fn export_items_json(&self, user_id: &str) -> Result<String, CoreError> {
        let items = self.get_items(user_id).await?;
        Ok(serde_json::to_string_pretty(&items)?)
    }

    /// Import candidates from a JSON array string, with merge semantics
    /// (`import_items`). Returns the resulting holdings.
    pub async fn import_items_json(
        &self,
        user_id: &str,
        json: &str,
    ) -> Result<Vec<Holding>, CoreError> {
        let candidates: Vec<HoldingInput> = serde_json::from_str(json)?;
        self.import_items(user_id, candidates).await
    }

    // ── Internal ────────────────────────────────────────────────────

    async fn find(&self, user_id: &str) -> Result<Option<Portfolio>, CoreError> {
        self.store.find_one(user_id).await.map_err(|e| {
            log::error!("portfolio lookup failed for user {user_id}: {e}");
            e
        })
    }

    async fn find_or_new(&self, user_id: &str) -> Result<Portfolio, CoreError> {
        Ok(self
            .find(user_id)
            .await?
            .unwrap_or_else(|| Portfolio::new(user_id)))
    }

    async fn persist(&self, portfolio: &mut Portfolio) -> Result<(), CoreError> {
        portfolio.touch();
        self.store.save(portfolio).await.map_err(|e| {
            log::error!(
                "portfolio save failed for user {}: {e}",
                portfolio.user_id
            );
            e
        })
    }
}
