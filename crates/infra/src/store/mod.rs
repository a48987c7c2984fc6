//! Entity store: persistent records for groups, children, categories and stock.
//!
//! The store owns referential integrity (a child belongs to a group, a stock
//! item belongs to a child and references a category) and the atomicity of
//! stock adjustments. Services above it stay free of locking concerns.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use kidstock_core::{ChildId, DomainError, GroupId};
use kidstock_inventory::{
    Child, ClothingCategory, ClothingCategoryId, Group, ShareToken, StockAdjustment, StockEntry,
};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryEntityStore;
pub use postgres::PostgresEntityStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A domain rule was violated by the requested write (missing parent,
    /// unknown category, insufficient stock, duplicate token).
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for the household model.
///
/// ## Atomicity
///
/// [`EntityStore::adjust_stock`] is the only read-modify-write operation. An
/// implementation must make the existence checks, the non-negative check and the
/// write a single atomic step per `(child, category)` pair: two concurrent
/// decrements of 1 against a count of 1 yield exactly one success.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a new group. A share token already in use is a `Conflict`.
    async fn insert_group(&self, group: Group) -> StoreResult<Group>;

    async fn group_by_token(&self, token: &ShareToken) -> StoreResult<Option<Group>>;

    /// Children of a group, oldest first.
    async fn children_of_group(&self, group_id: GroupId) -> StoreResult<Vec<Child>>;

    /// Insert a child. Fails with `GroupNotFound` if its group is gone.
    async fn insert_child(&self, child: Child) -> StoreResult<Child>;

    async fn child(&self, child_id: ChildId) -> StoreResult<Option<Child>>;

    /// Overwrite name and `updated_at` of an existing child.
    async fn update_child(&self, child: Child) -> StoreResult<Child>;

    /// Delete a child together with all of its stock items.
    async fn delete_child(&self, child_id: ChildId) -> StoreResult<()>;

    /// All categories in display order.
    async fn categories(&self) -> StoreResult<Vec<ClothingCategory>>;

    async fn category(&self, id: ClothingCategoryId) -> StoreResult<Option<ClothingCategory>>;

    async fn upsert_category(&self, category: ClothingCategory) -> StoreResult<()>;

    /// Stock entries of a child in category display order.
    async fn stock_for_child(&self, child_id: ChildId) -> StoreResult<Vec<StockEntry>>;

    /// Atomically apply `adjustment` to the `(child, category)` stock item,
    /// creating it at zero first when absent.
    async fn adjust_stock(
        &self,
        child_id: ChildId,
        category_id: ClothingCategoryId,
        adjustment: StockAdjustment,
        now: DateTime<Utc>,
    ) -> StoreResult<StockEntry>;
}

#[async_trait]
impl<S> EntityStore for Arc<S>
where
    S: EntityStore + ?Sized,
{
    async fn insert_group(&self, group: Group) -> StoreResult<Group> {
        (**self).insert_group(group).await
    }

    async fn group_by_token(&self, token: &ShareToken) -> StoreResult<Option<Group>> {
        (**self).group_by_token(token).await
    }

    async fn children_of_group(&self, group_id: GroupId) -> StoreResult<Vec<Child>> {
        (**self).children_of_group(group_id).await
    }

    async fn insert_child(&self, child: Child) -> StoreResult<Child> {
        (**self).insert_child(child).await
    }

    async fn child(&self, child_id: ChildId) -> StoreResult<Option<Child>> {
        (**self).child(child_id).await
    }

    async fn update_child(&self, child: Child) -> StoreResult<Child> {
        (**self).update_child(child).await
    }

    async fn delete_child(&self, child_id: ChildId) -> StoreResult<()> {
        (**self).delete_child(child_id).await
    }

    async fn categories(&self) -> StoreResult<Vec<ClothingCategory>> {
        (**self).categories().await
    }

    async fn category(&self, id: ClothingCategoryId) -> StoreResult<Option<ClothingCategory>> {
        (**self).category(id).await
    }

    async fn upsert_category(&self, category: ClothingCategory) -> StoreResult<()> {
        (**self).upsert_category(category).await
    }

    async fn stock_for_child(&self, child_id: ChildId) -> StoreResult<Vec<StockEntry>> {
        (**self).stock_for_child(child_id).await
    }

    async fn adjust_stock(
        &self,
        child_id: ChildId,
        category_id: ClothingCategoryId,
        adjustment: StockAdjustment,
        now: DateTime<Utc>,
    ) -> StoreResult<StockEntry> {
        (**self).adjust_stock(child_id, category_id, adjustment, now).await
    }
}
