use axum::{
    Json,
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use kidstock_core::DomainError;
use kidstock_infra::services::ServiceError;

use crate::app::dto::{Envelope, FieldErrors};

/// Success response wrapped in the envelope.
pub fn ok<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> Response {
    (status, Json(Envelope::ok(message, data))).into_response()
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Envelope::failure(message, None))).into_response()
}

fn validation_error(field: String, message: String) -> Response {
    let mut errors = FieldErrors::new();
    errors.insert(field, vec![message.clone()]);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(Envelope::failure(message, Some(errors))),
    )
        .into_response()
}

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Domain(DomainError::Validation { field, message }) => {
            validation_error(field, message)
        }
        ServiceError::Domain(e) => json_error(status_for(&e), e.to_string()),
        ServiceError::Store(detail) => {
            tracing::error!(error = %detail, "request failed on storage");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

/// `Json` extractor whose rejections use the envelope (422) instead of plain text.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                rejection.body_text(),
            )),
        }
    }
}
