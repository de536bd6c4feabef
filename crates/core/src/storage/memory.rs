use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;

use super::traits::PortfolioStore;

/// In-memory `PortfolioStore` backed by a `HashMap` behind an `RwLock`.
///
/// Whole documents are cloned in and out under the lock, so each write is
/// atomic per document exactly as the trait requires. Suitable for tests
/// and for embedders that don't need durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Portfolio>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of portfolio documents currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn find_one(&self, user_id: &str) -> Result<Option<Portfolio>, CoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| CoreError::Persistence(e.to_string()))?;
        Ok(documents.get(user_id).cloned())
    }

    async fn upsert_items(
        &self,
        user_id: &str,
        items: Vec<Holding>,
    ) -> Result<Portfolio, CoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| CoreError::Persistence(e.to_string()))?;
        let doc = documents
            .entry(user_id.to_string())
            .or_insert_with(|| Portfolio::new(user_id));
        doc.items = items;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn save(&self, portfolio: &Portfolio) -> Result<(), CoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| CoreError::Persistence(e.to_string()))?;
        documents.insert(portfolio.user_id.clone(), portfolio.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool, CoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| CoreError::Persistence(e.to_string()))?;
        Ok(documents.remove(user_id).is_some())
    }
}
