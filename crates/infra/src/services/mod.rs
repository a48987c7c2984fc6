//! Application services over an [`EntityStore`](crate::store::EntityStore).
//!
//! Services validate input, call the store and log outcomes. They hold no state
//! between calls besides the store handle, so one instance can serve every request.

use thiserror::Error;

use kidstock_core::DomainError;

use crate::store::StoreError;

pub mod groups;
pub mod stock;

pub use groups::GroupService;
pub use stock::StockService;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Infrastructure failure; the message is for logs, not for end users.
    #[error("storage failure: {0}")]
    Store(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(e) => Self::Domain(e),
            other => Self::Store(other.to_string()),
        }
    }
}
