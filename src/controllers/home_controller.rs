use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
};
use serde_json::json;

use crate::{render, AppState};

use super::{is_htmx, partial};

pub async fn not_found(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let body = match state.hbs.render("pages/not_found", &json!({})) {
        Ok(s) => s,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("template error: {e}")))
                .into_response()
        }
    };

    if is_htmx(&headers) {
        return (StatusCode::NOT_FOUND, Html(body)).into_response();
    }

    match render::render_full(&state, None, body) {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e.to_string())).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Html("ok".to_string()))
}

// GET /market-status (HTMX partial, polled by the layout)
pub async fn get_market_status(State(state): State<AppState>) -> impl IntoResponse {
    partial(&state, "partials/market_status", &render::market_banner(&state))
}
