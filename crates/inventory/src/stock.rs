use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidstock_core::{ChildId, DomainError, DomainResult, StockItemId};

use crate::category::{ClothingCategory, ClothingCategoryId};

/// Count of one clothing category held for one child.
///
/// Identified by `(child_id, clothing_category_id)`; `id` is a surrogate key.
/// `current_count` is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: StockItemId,
    pub child_id: ChildId,
    pub clothing_category_id: ClothingCategoryId,
    pub current_count: i64,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// A not-yet-persisted item with a count of zero.
    pub fn empty(child_id: ChildId, clothing_category_id: ClothingCategoryId, now: DateTime<Utc>) -> Self {
        Self {
            id: StockItemId::new(),
            child_id,
            clothing_category_id,
            current_count: 0,
            updated_at: now,
        }
    }

    /// Apply `adjustment`, leaving `self` untouched when it is rejected.
    pub fn adjust(&mut self, adjustment: StockAdjustment, now: DateTime<Utc>) -> DomainResult<()> {
        self.current_count = adjustment.apply(self.current_count)?;
        self.updated_at = now;
        Ok(())
    }
}

/// A stock item joined with its category, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    #[serde(flatten)]
    pub item: StockItem,
    pub clothing_category: ClothingCategory,
}

/// Sort entries by their category's display order.
pub fn sort_entries(entries: &mut [StockEntry]) {
    entries.sort_by(|a, b| a.clothing_category.display_cmp(&b.clothing_category));
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AdjustmentKind {
    Increment,
    Decrement,
}

/// A validated request to move a stock count up or down.
///
/// The amount is always at least 1; construct through [`StockAdjustment::increment`]
/// or [`StockAdjustment::decrement`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    kind: AdjustmentKind,
    amount: i64,
}

impl StockAdjustment {
    pub fn increment(amount: i64) -> DomainResult<Self> {
        Self::new(AdjustmentKind::Increment, amount, "increment")
    }

    pub fn decrement(amount: i64) -> DomainResult<Self> {
        Self::new(AdjustmentKind::Decrement, amount, "decrement")
    }

    fn new(kind: AdjustmentKind, amount: i64, field: &str) -> DomainResult<Self> {
        if amount < 1 {
            return Err(DomainError::validation(
                field,
                format!("{field} must be a positive integer"),
            ));
        }
        Ok(Self { kind, amount })
    }

    pub fn kind(&self) -> AdjustmentKind {
        self.kind
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Signed change to the count.
    pub fn delta(&self) -> i64 {
        match self.kind {
            AdjustmentKind::Increment => self.amount,
            AdjustmentKind::Decrement => -self.amount,
        }
    }

    /// Compute the count after applying this adjustment to `current`.
    ///
    /// Decrements never clamp: going below zero is rejected outright.
    pub fn apply(&self, current: i64) -> DomainResult<i64> {
        match self.kind {
            AdjustmentKind::Increment => current.checked_add(self.amount).ok_or_else(|| {
                DomainError::validation("increment", "increment would overflow the stock count")
            }),
            AdjustmentKind::Decrement => {
                if current < self.amount {
                    Err(DomainError::InsufficientStock {
                        available: current,
                        requested: self.amount,
                    })
                } else {
                    Ok(current - self.amount)
                }
            }
        }
    }
}
