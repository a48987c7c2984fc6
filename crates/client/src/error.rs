use std::collections::BTreeMap;

use kidstock_core::DomainError;

/// Field name -> messages, as returned in the envelope's `errors` map.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally; no request was sent.
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    #[error("network error: {0}")]
    Network(String),

    /// The API answered with `success: false` or a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        errors: FieldErrors,
    },

    #[error("parse error: {0}")]
    Parse(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { field, message } => Self::Validation { field, message },
            other => Self::Validation {
                field: String::new(),
                message: other.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
