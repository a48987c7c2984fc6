use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::Response};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.groups.categories().await {
        Ok(categories) => errors::ok(StatusCode::OK, "clothing categories retrieved", categories),
        Err(e) => errors::service_error_to_response(e),
    }
}
