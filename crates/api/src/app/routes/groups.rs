use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
};

use crate::app::dto::NameRequest;
use crate::app::errors::{self, ApiJson};
use crate::app::services::AppServices;

pub async fn create_group(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<NameRequest>,
) -> Response {
    match services.groups.create_group(&body.name).await {
        Ok(group) => errors::ok(StatusCode::CREATED, "group created", group),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_group(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
) -> Response {
    match services.groups.group_by_token(&token).await {
        Ok(group) => errors::ok(StatusCode::OK, "group retrieved", group),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_children(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
) -> Response {
    match services.groups.children_by_token(&token).await {
        Ok(children) => errors::ok(StatusCode::OK, "children retrieved", children),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_child(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
    ApiJson(body): ApiJson<NameRequest>,
) -> Response {
    match services.groups.add_child(&token, &body.name).await {
        Ok(child) => errors::ok(StatusCode::CREATED, "child created", child),
        Err(e) => errors::service_error_to_response(e),
    }
}
