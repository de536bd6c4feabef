use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::{clamp_stored, Holding, HoldingInput, HoldingPatch};
use crate::models::portfolio::{Portfolio, MAX_ITEMS};

/// Produce the canonical form of a symbol: stringify, trim surrounding
/// whitespace, uppercase. Absence of input yields the empty string, which
/// callers treat as "no symbol".
///
/// Idempotent: normalizing an already-normalized symbol is a no-op.
#[must_use]
pub fn normalize_symbol(raw: Option<&str>) -> String {
    raw.unwrap_or_default().trim().to_uppercase()
}

/// Applies the portfolio reconciliation rules: symbol normalization,
/// de-duplication, weighted-average merging, and the item cap.
///
/// Pure business logic — no I/O. Every method mutates an in-memory
/// `Portfolio` the caller loaded; on `Err` the caller must discard the
/// copy instead of persisting it, so rejected operations leave no
/// partial effect.
pub struct PortfolioReconciler;

impl PortfolioReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Build the item list for a full overwrite (replace).
    ///
    /// Candidates are normalized in input order; entries with an empty
    /// normalized symbol are dropped, and later duplicates of a symbol are
    /// silently discarded — first occurrence wins, no merging.
    pub fn build_replacement(&self, candidates: Vec<HoldingInput>) -> Vec<Holding> {
        let mut seen = std::collections::HashSet::new();
        let mut items = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let symbol = normalize_symbol(candidate.symbol.as_deref());
            if symbol.is_empty() {
                continue;
            }
            if !seen.insert(symbol.clone()) {
                continue;
            }
            items.push(Holding::new(
                symbol,
                candidate.amount,
                candidate.avg_price,
                candidate.notes,
                candidate.metadata,
            ));
        }

        items
    }

    /// Append a single new holding. Never merges: a candidate whose symbol
    /// is already held is a conflict, unlike `import`.
    pub fn add(&self, portfolio: &mut Portfolio, candidate: HoldingInput) -> Result<Uuid, CoreError> {
        let symbol = normalize_symbol(candidate.symbol.as_deref());
        if symbol.is_empty() {
            return Err(CoreError::Validation("symbol is required".into()));
        }
        if portfolio.item_by_symbol(&symbol).is_some() {
            return Err(CoreError::SymbolExists(symbol));
        }

        let holding = Holding::new(
            symbol,
            candidate.amount,
            candidate.avg_price,
            candidate.notes,
            candidate.metadata,
        );
        let id = holding.id;
        portfolio.items.push(holding);

        if portfolio.items.len() > MAX_ITEMS {
            return Err(CoreError::LimitExceeded {
                count: portfolio.items.len(),
                limit: MAX_ITEMS,
            });
        }

        Ok(id)
    }

    /// Apply a partial update to one holding. Only supplied fields change;
    /// numeric fields are clamped to finite non-negative values.
    pub fn apply_patch(
        &self,
        portfolio: &mut Portfolio,
        item_id: Uuid,
        patch: HoldingPatch,
    ) -> Result<(), CoreError> {
        let item = portfolio
            .item_mut(item_id)
            .ok_or_else(|| CoreError::HoldingNotFound(item_id.to_string()))?;

        if let Some(amount) = patch.amount {
            item.amount = clamp_stored(amount);
        }
        if let Some(avg_price) = patch.avg_price {
            item.avg_price = clamp_stored(avg_price);
        }
        if let Some(notes) = patch.notes {
            item.notes = notes;
        }
        if let Some(metadata) = patch.metadata {
            item.metadata = metadata;
        }
        item.touch();

        Ok(())
    }

    /// Remove one holding by its identifier. Other holdings keep their
    /// identifiers and relative order.
    pub fn remove(&self, portfolio: &mut Portfolio, item_id: Uuid) -> Result<(), CoreError> {
        let idx = portfolio
            .items
            .iter()
            .position(|h| h.id == item_id)
            .ok_or_else(|| CoreError::HoldingNotFound(item_id.to_string()))?;
        portfolio.items.remove(idx);
        Ok(())
    }

    /// Merge a batch of candidates into the portfolio (import).
    ///
    /// Candidates are processed in input order. An empty normalized symbol
    /// is a silent skip. A symbol already held — whether from before the
    /// import or appended earlier in the same batch — merges via the
    /// quantity-weighted average cost basis:
    ///
    ///   new_amount    = existing.amount + candidate.amount
    ///   new_avg_price = (existing.avg_price * existing.amount
    ///                    + candidate.avg_price * candidate.amount) / new_amount
    ///
    /// When the merged amount is not positive, `avg_price` is left unchanged
    /// (avoids division by zero) and the stored amount floors at 0.
    /// Candidate amounts may be negative: import treats them as deltas.
    ///
    /// The item cap is validated once, against the post-merge count; on
    /// overflow the entire import is rejected.
    pub fn import(
        &self,
        portfolio: &mut Portfolio,
        candidates: Vec<HoldingInput>,
    ) -> Result<(), CoreError> {
        for candidate in candidates {
            let symbol = normalize_symbol(candidate.symbol.as_deref());
            if symbol.is_empty() {
                continue;
            }

            match portfolio.item_by_symbol_mut(&symbol) {
                Some(existing) => {
                    let total = existing.amount + candidate.amount;
                    if total > 0.0 {
                        existing.avg_price = clamp_stored(
                            (existing.avg_price * existing.amount
                                + candidate.avg_price * candidate.amount)
                                / total,
                        );
                    }
                    existing.amount = clamp_stored(total);
                    existing.touch();
                }
                None => {
                    portfolio.items.push(Holding::new(
                        symbol,
                        candidate.amount,
                        candidate.avg_price,
                        candidate.notes,
                        candidate.metadata,
                    ));
                }
            }
        }

        if portfolio.items.len() > MAX_ITEMS {
            return Err(CoreError::LimitExceeded {
                count: portfolio.items.len(),
                limit: MAX_ITEMS,
            });
        }

        Ok(())
    }
}

impl Default for PortfolioReconciler {
    fn default() -> Self {
        Self::new()
    }
}
