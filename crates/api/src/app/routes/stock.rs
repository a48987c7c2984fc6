use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
};

use kidstock_inventory::{ClothingCategoryId, StockAdjustment};

use crate::app::dto::{StockDecrementRequest, StockIncrementRequest};
use crate::app::errors::{self, ApiJson};
use crate::app::routes::children::parse_child_id;
use crate::app::services::AppServices;

pub async fn child_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let child_id = match parse_child_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.stock.child_stock(child_id).await {
        Ok(entries) => errors::ok(StatusCode::OK, "stock retrieved", entries),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn increment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StockIncrementRequest>,
) -> Response {
    // A bad amount is reported before the path id is looked at.
    if let Err(e) = StockAdjustment::increment(body.increment) {
        return errors::service_error_to_response(e.into());
    }
    let child_id = match parse_child_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    let category_id = ClothingCategoryId(body.clothing_category_id);
    match services.stock.increment(child_id, category_id, body.increment).await {
        Ok(entry) => errors::ok(StatusCode::OK, "stock incremented", entry),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn decrement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StockDecrementRequest>,
) -> Response {
    // A bad amount is reported before the path id is looked at.
    if let Err(e) = StockAdjustment::decrement(body.decrement) {
        return errors::service_error_to_response(e.into());
    }
    let child_id = match parse_child_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    let category_id = ClothingCategoryId(body.clothing_category_id);
    match services.stock.decrement(child_id, category_id, body.decrement).await {
        Ok(entry) => errors::ok(StatusCode::OK, "stock decremented", entry),
        Err(e) => errors::service_error_to_response(e),
    }
}
