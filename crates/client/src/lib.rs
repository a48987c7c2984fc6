//! Typed HTTP client for the kidstock API.
//!
//! Construct an [`ApiGateway`] from an explicit [`ClientConfig`]; nothing here
//! is process-global, so several gateways with different targets can coexist.

pub mod config;
pub mod error;
pub mod gateway;

pub use config::ClientConfig;
pub use error::{ClientError, FieldErrors};
pub use gateway::{ApiEnvelope, ApiGateway};
