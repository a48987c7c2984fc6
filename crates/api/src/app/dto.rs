use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /groups`, `POST /groups/:token/children` and `PUT /children/:id`.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StockIncrementRequest {
    pub clothing_category_id: i64,
    pub increment: i64,
}

#[derive(Debug, Deserialize)]
pub struct StockDecrementRequest {
    pub clothing_category_id: i64,
    pub decrement: i64,
}

// -------------------------
// Response envelope
// -------------------------

/// Field name -> messages, as reported for validation failures.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The JSON shape every endpoint responds with.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>, errors: Option<FieldErrors>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
        }
    }

    /// Success without a payload (`data: null`).
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
        }
    }
}
