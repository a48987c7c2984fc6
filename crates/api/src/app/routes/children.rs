use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use kidstock_core::{ChildId, DomainError};

use crate::app::dto::{Envelope, NameRequest};
use crate::app::errors::{self, ApiJson};
use crate::app::services::AppServices;

/// Parse a child id from the path; a malformed id addresses no child.
pub(crate) fn parse_child_id(raw: &str) -> Result<ChildId, Response> {
    raw.parse::<ChildId>().map_err(|_| {
        errors::json_error(StatusCode::NOT_FOUND, DomainError::ChildNotFound.to_string())
    })
}

pub async fn get_child(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let child_id = match parse_child_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.groups.child(child_id).await {
        Ok(child) => errors::ok(StatusCode::OK, "child retrieved", child),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_child(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NameRequest>,
) -> Response {
    let child_id = match parse_child_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.groups.update_child(child_id, &body.name).await {
        Ok(child) => errors::ok(StatusCode::OK, "child updated", child),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_child(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let child_id = match parse_child_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.groups.delete_child(child_id).await {
        Ok(()) => (StatusCode::OK, Json(Envelope::empty("child deleted"))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
