use axum::{
    Router,
    routing::{get, post},
};

pub mod categories;
pub mod children;
pub mod groups;
pub mod stock;
pub mod system;

/// Router for every household endpoint (everything except `/health`).
pub fn router() -> Router {
    Router::new()
        .route("/groups", post(groups::create_group))
        .route("/groups/:token", get(groups::get_group))
        .route(
            "/groups/:token/children",
            get(groups::list_children).post(groups::add_child),
        )
        .route(
            "/children/:id",
            get(children::get_child)
                .put(children::update_child)
                .delete(children::delete_child),
        )
        .route("/children/:id/stock", get(stock::child_stock))
        .route("/children/:id/stock-increment", post(stock::increment))
        .route("/children/:id/stock-decrement", post(stock::decrement))
        .route("/clothing-categories", get(categories::list_categories))
}
