use axum::{Router, routing::get};

use crate::{AppState, controllers::predictions_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/predictions", get(predictions_controller::get_predictions_page))
        .route("/predictions/run", get(predictions_controller::get_projection))
}
