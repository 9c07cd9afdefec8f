use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use tower_http::services::ServeDir;

use crate::{AppState, controllers::home_controller};

pub mod home_routes;
pub mod stocks_routes;
pub mod portfolio_routes;
pub mod alerts_routes;
pub mod notifications_routes;
pub mod export_routes;
pub mod predictions_routes;
pub mod indices_routes;

/// Section routes only, without the session layer. Tests mount this and
/// insert a session handle themselves.
pub fn section_routes() -> Router<AppState> {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = stocks_routes::add_routes(router);
    let router = portfolio_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);
    let router = notifications_routes::add_routes(router);
    let router = export_routes::add_routes(router);
    let router = predictions_routes::add_routes(router);
    indices_routes::add_routes(router)
}

/// Routes that never touch a session, mounted outside `attach_session`.
fn stateless_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(home_controller::health))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(home_controller::not_found)
}

pub fn app(state: AppState) -> Router {
    section_routes()
        .layer(from_fn_with_state(state.clone(), crate::session::attach_session))
        .merge(stateless_routes())
        .with_state(state)
}
