use chrono::Utc;

use kidstock_core::{ChildId, DomainError};
use kidstock_inventory::{ClothingCategoryId, StockAdjustment, StockEntry};

use crate::store::EntityStore;

use super::{ServiceError, ServiceResult};

/// Stock mutation service: increments, decrements and per-child listings.
///
/// Amounts are validated before the store is touched; the store performs the
/// existence checks and the non-negative check atomically with the write.
/// Mutations are not idempotent, so nothing here retries.
#[derive(Debug, Clone)]
pub struct StockService<S> {
    store: S,
}

impl<S> StockService<S>
where
    S: EntityStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn increment(
        &self,
        child_id: ChildId,
        category_id: ClothingCategoryId,
        amount: i64,
    ) -> ServiceResult<StockEntry> {
        let adjustment = StockAdjustment::increment(amount)?;
        self.apply(child_id, category_id, adjustment).await
    }

    pub async fn decrement(
        &self,
        child_id: ChildId,
        category_id: ClothingCategoryId,
        amount: i64,
    ) -> ServiceResult<StockEntry> {
        let adjustment = StockAdjustment::decrement(amount)?;
        self.apply(child_id, category_id, adjustment).await
    }

    /// All stock entries of a child, in category display order.
    pub async fn child_stock(&self, child_id: ChildId) -> ServiceResult<Vec<StockEntry>> {
        Ok(self.store.stock_for_child(child_id).await?)
    }

    async fn apply(
        &self,
        child_id: ChildId,
        category_id: ClothingCategoryId,
        adjustment: StockAdjustment,
    ) -> ServiceResult<StockEntry> {
        match self
            .store
            .adjust_stock(child_id, category_id, adjustment, Utc::now())
            .await
        {
            Ok(entry) => {
                tracing::info!(
                    child_id = %child_id,
                    category_id = %category_id,
                    delta = adjustment.delta(),
                    current_count = entry.item.current_count,
                    "stock adjusted"
                );
                Ok(entry)
            }
            Err(e) => {
                let err = ServiceError::from(e);
                if let ServiceError::Domain(DomainError::InsufficientStock { available, requested }) = &err {
                    tracing::warn!(
                        child_id = %child_id,
                        category_id = %category_id,
                        available,
                        requested,
                        "decrement rejected: insufficient stock"
                    );
                }
                Err(err)
            }
        }
    }
}
