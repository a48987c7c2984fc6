//! `kidstock-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{ChildId, GroupId, StockItemId};
pub use value_object::{BoundedName, ValueObject, NAME_MAX_CHARS};
