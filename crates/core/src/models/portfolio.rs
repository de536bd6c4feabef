use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::holding::Holding;

/// Maximum number of holdings one portfolio may contain. Any mutation that
/// would exceed this is rejected whole, with no partial application.
pub const MAX_ITEMS: usize = 2000;

/// One user's portfolio document: the full set of their holdings.
///
/// Exactly one document exists per user, created lazily on the first write —
/// a user with no document simply reads as an empty holding set. Item order
/// is insertion order; it carries no meaning but is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    /// Owning user identifier (opaque, supplied by the identity layer).
    pub user_id: String,

    #[serde(default)]
    pub items: Vec<Holding>,

    /// Refreshed whenever the item collection changes.
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    /// Create an empty portfolio for a user. Called lazily on first write;
    /// bare reads never create a document.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Look up a holding by its stable identifier.
    #[must_use]
    pub fn item(&self, id: Uuid) -> Option<&Holding> {
        self.items.iter().find(|h| h.id == id)
    }

    pub fn item_mut(&mut self, id: Uuid) -> Option<&mut Holding> {
        self.items.iter_mut().find(|h| h.id == id)
    }

    /// Look up a holding by normalized symbol. Stored symbols are already
    /// normalized, so this is an exact comparison.
    #[must_use]
    pub fn item_by_symbol(&self, symbol: &str) -> Option<&Holding> {
        self.items.iter().find(|h| h.symbol == symbol)
    }

    pub fn item_by_symbol_mut(&mut self, symbol: &str) -> Option<&mut Holding> {
        self.items.iter_mut().find(|h| h.symbol == symbol)
    }

    /// Refresh the document's mutation timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
