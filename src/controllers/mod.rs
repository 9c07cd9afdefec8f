//! HTTP handlers, one module per dashboard section.
//!
//! Every page handler renders its section body and, unless the request came
//! from htmx, wraps it in the base layout.

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::{render, sections::Section, AppState};

pub mod alerts_controller;
pub mod export_controller;
pub mod home_controller;
pub mod indices_controller;
pub mod notifications_controller;
pub mod portfolio_controller;
pub mod predictions_controller;
pub mod stocks_controller;

pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub(crate) fn fmt2(x: f64) -> String {
    format!("{:.2}", x)
}

pub(crate) fn hx_trigger_value(events: &[&str]) -> HeaderValue {
    if events.len() == 1 {
        return HeaderValue::from_str(events[0]).unwrap_or_else(|_| HeaderValue::from_static(""));
    }

    let mut map = serde_json::Map::new();
    for &e in events {
        map.insert(e.to_string(), serde_json::Value::Bool(true));
    }

    let json = serde_json::Value::Object(map).to_string();
    HeaderValue::from_str(&json).unwrap_or_else(|_| HeaderValue::from_static(""))
}

pub(crate) fn render_partial(state: &AppState, tpl: &str, ctx: &serde_json::Value) -> String {
    state
        .hbs
        .render(tpl, ctx)
        .unwrap_or_else(|e| format!("template error: {e}"))
}

/// 200 with a rendered partial.
pub(crate) fn partial(state: &AppState, tpl: &str, ctx: &serde_json::Value) -> Response {
    (StatusCode::OK, Html(render_partial(state, tpl, ctx))).into_response()
}

/// Render a section's page template, full or htmx-partial.
pub(crate) fn section_page(
    state: &AppState,
    headers: &HeaderMap,
    section: Section,
    ctx: &serde_json::Value,
) -> Response {
    let body = match state.hbs.render(section.template(), ctx) {
        Ok(s) => s,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("template error: {e}")),
            )
                .into_response()
        }
    };

    if is_htmx(headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(state, Some(section), body) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e.to_string())).into_response(),
    }
}

/// Form amount: accepts a decimal comma, rejects NaN and infinities.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
