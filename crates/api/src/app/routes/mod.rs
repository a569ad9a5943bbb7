use axum::{
    Router,
    routing::{get, patch, post},
};

pub mod auth;
pub mod common;
pub mod company;
pub mod inventory;
pub mod items;
pub mod reports;
pub mod system;
pub mod users;
pub mod warehouses;

/// Router for all authenticated (company-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/:id", axum::routing::delete(users::delete_user))
        .route("/company", get(company::get_company).patch(company::update_company))
        .route(
            "/warehouses",
            get(warehouses::list_warehouses).post(warehouses::create_warehouse),
        )
        .route(
            "/warehouses/selected",
            get(warehouses::selected_warehouse).put(warehouses::select_warehouse),
        )
        .route(
            "/warehouses/:id",
            patch(warehouses::update_warehouse).delete(warehouses::delete_warehouse),
        )
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/usage", get(items::usage))
        .route(
            "/items/:id",
            get(items::get_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        .route(
            "/items/:id/movements",
            get(items::item_movements).post(items::register_movement),
        )
        .route("/movements", get(inventory::list_movements))
        .route("/summary", get(inventory::summary))
        .route("/daily-reset", post(inventory::daily_reset))
        .route("/import", post(reports::import_csv))
        .route("/export/csv", get(reports::export_csv))
        .route("/reports/:format", get(reports::download_report))
}
