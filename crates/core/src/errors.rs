use thiserror::Error;

/// Unified error type for the entire cryptofolio-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Portfolio not found for user: {0}")]
    PortfolioNotFound(String),

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    #[error("Holding already exists for symbol: {0}")]
    SymbolExists(String),

    #[error("Portfolio item limit of {limit} exceeded ({count} items)")]
    LimitExceeded { count: usize, limit: usize },

    // ── Persistence ─────────────────────────────────────────────────
    #[error("Persistence failure: {0}")]
    Persistence(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}
