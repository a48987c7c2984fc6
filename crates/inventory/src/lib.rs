//! Clothing stock domain.
//!
//! This crate contains the household model (groups, children, clothing
//! categories, stock items) and the rules for adjusting stock counts,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod child;
pub mod group;
pub mod stock;

pub use category::{ClothingCategory, ClothingCategoryId, default_catalog, sort_categories};
pub use child::Child;
pub use group::{Group, GroupWithChildren, SHARE_TOKEN_BYTES, ShareToken};
pub use stock::{AdjustmentKind, StockAdjustment, StockEntry, StockItem, sort_entries};
