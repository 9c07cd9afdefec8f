use axum::{Router, routing::get};

use crate::{AppState, controllers::export_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/export", get(export_controller::get_export_page))
        .route("/export/preview", get(export_controller::get_export_preview))
        .route("/export/:file", get(export_controller::get_export_file))
}
