use axum::{Router, routing::get};

use crate::{AppState, controllers::indices_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/indices", get(indices_controller::get_indices_page))
        .route("/indices/compare", get(indices_controller::get_indices_compare))
}
