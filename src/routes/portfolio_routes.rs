use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::portfolio_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/portfolio",
            get(portfolio_controller::get_portfolio_page).post(portfolio_controller::post_add_position),
        )
        .route("/portfolio/positions", get(portfolio_controller::get_portfolio_positions))
        .route("/portfolio/clear", post(portfolio_controller::post_clear_portfolio))
}
