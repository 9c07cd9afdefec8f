use chrono::Utc;
use serde_json::json;

use crate::{
    error::AppError,
    sections::{Section, SECTIONS},
    services::market_clock::{session_status, NEW_YORK_TZ, PARIS_TZ},
    AppState,
};

/// Clocks and Euronext status shown on every page.
pub fn market_banner(state: &AppState) -> serde_json::Value {
    let now = Utc::now();
    let status = session_status(&now, &state.calendar);

    json!({
        "paris_time": now.with_timezone(&PARIS_TZ).format("%H:%M:%S").to_string(),
        "new_york_time": now.with_timezone(&NEW_YORK_TZ).format("%H:%M:%S").to_string(),
        "status": status.label(),
        "indicator": status.indicator(),
        "is_open": status.is_open(),
    })
}

pub fn render_full(
    state: &AppState,
    active: Option<Section>,
    body_html: String,
) -> Result<String, AppError> {
    let nav: Vec<serde_json::Value> = SECTIONS
        .iter()
        .map(|i| {
            json!({
                "path": i.path,
                "title": i.title,
                "active": Some(i.section) == active,
            })
        })
        .collect();

    let title = active.map(Section::title).unwrap_or("Not found");

    let ctx = json!({
        "title": title,
        "body": body_html,
        "nav": nav,
        "market": market_banner(state),
    });

    Ok(state.hbs.render("layouts/base", &ctx)?)
}

/// One inline message for the `messages` partial.
pub fn flash(class: &str, text: impl Into<String>) -> serde_json::Value {
    json!({ "class": class, "text": text.into() })
}

pub fn error_flash(err: &AppError) -> serde_json::Value {
    flash(err.css_class(), err.to_string())
}
