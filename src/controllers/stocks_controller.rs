use axum::{
    extract::{Extension, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{
    sections::Section,
    services::stocks_service::{self, DashboardQuery},
    session::SessionHandle,
    AppState,
};

use super::{hx_trigger_value, partial, render_partial, section_page};

// GET / (SSR page; the panel is rendered inline so the page works without JS)
pub async fn get_dashboard_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<SessionHandle>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let panel = stocks_service::dashboard_ctx(&state, &session, &query).await;
    let panel_html = render_partial(&state, "partials/dashboard_panel", &panel);

    section_page(
        &state,
        &headers,
        Section::Dashboard,
        &json!({ "panel_html": panel_html }),
    )
}

// GET /dashboard/panel (HTMX partial)
pub async fn get_dashboard_panel(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let ctx = stocks_service::dashboard_ctx(&state, &session, &query).await;
    let html = render_partial(&state, "partials/dashboard_panel", &ctx);

    let mut events = Vec::new();
    if ctx["watchlist_changed"].as_bool().unwrap_or(false) {
        events.push("watchlistUpdated");
    }
    if ctx["alerts_fired"].as_u64().unwrap_or(0) > 0 {
        events.push("alertsUpdated");
    }

    let mut res = (StatusCode::OK, Html(html)).into_response();
    if !events.is_empty() {
        res.headers_mut().insert("HX-Trigger", hx_trigger_value(&events));
    }
    res
}

// GET /watchlist (HTMX partial)
pub async fn get_watchlist(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let ctx = stocks_service::watchlist_ctx(&state, &session).await;
    partial(&state, "partials/watchlist", &ctx)
}
