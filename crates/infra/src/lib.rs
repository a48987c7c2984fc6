//! Infrastructure layer: entity stores, application services and config.

pub mod config;
pub mod services;
pub mod store;
