use axum::{
    extract::{Extension, Form, Path, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Condition, Session},
    render::{error_flash, flash},
    sections::Section,
    services::{alerts_service, exchange::format_currency, history::paris_time, symbols},
    session::SessionHandle,
    AppState,
};

use super::{hx_trigger_value, parse_amount, partial, section_page};

#[derive(Deserialize)]
pub struct CreateAlertForm {
    pub symbol: String,
    pub condition: String,
    pub target_price: String,
    // checkbox: present when ticked
    pub one_time: Option<String>,
}

fn alerts_ctx(session: &Session, messages: Vec<serde_json::Value>) -> serde_json::Value {
    let groups: Vec<serde_json::Value> = alerts_service::list_grouped(session)
        .into_iter()
        .map(|(symbol, alerts)| {
            let items: Vec<serde_json::Value> = alerts
                .iter()
                .map(|a| {
                    json!({
                        "id": a.id.to_string(),
                        "condition": a.condition.as_str(),
                        "target_price": format_currency(a.target_price, &a.symbol),
                        "one_time": a.one_time,
                        "created_at": paris_time(a.created_at),
                    })
                })
                .collect();
            json!({ "symbol": symbol, "alerts": items })
        })
        .collect();

    json!({
        "messages": messages,
        "groups": groups,
        "has_alerts": !groups.is_empty(),
    })
}

// GET /alerts (SSR page)
pub async fn get_alerts_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let symbol = session.lock().await.selection.symbol.clone();
    section_page(&state, &headers, Section::Alerts, &json!({ "symbol": symbol }))
}

// GET /alerts/list (HTMX partial)
pub async fn get_alerts_list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let ctx = alerts_ctx(&*session.lock().await, vec![]);
    partial(&state, "partials/alerts_list", &ctx)
}

fn parse_create(form: &CreateAlertForm) -> Result<(String, Option<String>, Condition, f64), AppError> {
    let symbol = symbols::normalize(&form.symbol);
    if symbol.is_empty() {
        return Err(AppError::InvalidInput("Symbol is required.".to_string()));
    }
    let resolved = symbols::resolve(&symbol)?;

    let condition = Condition::parse(&form.condition)
        .ok_or_else(|| AppError::InvalidInput("Condition must be above or below.".to_string()))?;
    let target = parse_amount(&form.target_price)
        .ok_or_else(|| AppError::InvalidInput("Please enter a valid target price.".to_string()))?;

    Ok((resolved.symbol, resolved.note, condition, target))
}

// POST /alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<CreateAlertForm>,
) -> Response {
    let one_time = form.one_time.is_some();
    let mut messages = Vec::new();
    let mut s = session.lock().await;

    let created = parse_create(&form).and_then(|(symbol, note, condition, target)| {
        if let Some(note) = note {
            messages.push(flash("text-info", note));
        }
        alerts_service::create_alert(&mut s, &symbol, condition, target, one_time)
    });

    let ok = match created {
        Ok(a) => {
            messages.push(flash(
                "text-success",
                format!(
                    "Alert set: {} {} {}",
                    a.symbol,
                    a.condition.as_str(),
                    format_currency(a.target_price, &a.symbol)
                ),
            ));
            true
        }
        Err(e) => {
            messages.push(error_flash(&e));
            false
        }
    };

    let ctx = alerts_ctx(&s, messages);
    drop(s);

    let mut res = partial(&state, "partials/alerts_list", &ctx);
    if ok {
        res.headers_mut()
            .insert("HX-Trigger", hx_trigger_value(&["alertsUpdated"]));
    }
    res
}

// POST /alerts/:id/delete
pub async fn post_delete_alert(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path(id): Path<String>,
) -> Response {
    let mut s = session.lock().await;

    let messages = match Uuid::parse_str(&id) {
        Ok(id) if alerts_service::delete_alert(&mut s, id) => {
            vec![flash("text-info", "Alert deleted")]
        }
        _ => vec![flash("text-warning", "Alert not found")],
    };

    let ctx = alerts_ctx(&s, messages);
    drop(s);

    let mut res = partial(&state, "partials/alerts_list", &ctx);
    res.headers_mut()
        .insert("HX-Trigger", hx_trigger_value(&["alertsUpdated"]));
    res
}
