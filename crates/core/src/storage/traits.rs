use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;

/// Trait abstraction over the document persistence backend.
///
/// One portfolio document per user, keyed by the opaque user identifier.
/// Implementations must guarantee that a single write of a whole document
/// (`save` or `upsert_items`) is atomic with respect to other readers and
/// writers of that same document; nothing stronger is assumed — no
/// cross-document transactions, no application-level locking.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Fetch a user's portfolio document, if one exists. Never creates one.
    async fn find_one(&self, user_id: &str) -> Result<Option<Portfolio>, CoreError>;

    /// Set a user's item list in one atomic write, creating the document if
    /// absent. Returns the stored document.
    async fn upsert_items(
        &self,
        user_id: &str,
        items: Vec<Holding>,
    ) -> Result<Portfolio, CoreError>;

    /// Persist a whole document in one atomic write, creating it if absent.
    async fn save(&self, portfolio: &Portfolio) -> Result<(), CoreError>;

    /// Drop a user's portfolio document. Used when the owning account is
    /// deleted. Returns whether a document existed.
    async fn delete(&self, user_id: &str) -> Result<bool, CoreError>;
}
