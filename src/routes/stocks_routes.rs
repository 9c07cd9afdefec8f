use axum::{Router, routing::get};

use crate::{AppState, controllers::stocks_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/", get(stocks_controller::get_dashboard_page))
        .route("/dashboard/panel", get(stocks_controller::get_dashboard_panel))
        .route("/watchlist", get(stocks_controller::get_watchlist))
}
