use axum::{
    extract::{Extension, Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    models::{Interval, Period},
    render::{error_flash, flash},
    sections::Section,
    services::{
        exchange::format_currency,
        market_data::{fetch_history, HistoryFetch},
        portfolio_service::profit_class,
        projection_service::{
            self, DEFAULT_DEGREE, DEFAULT_HORIZON, MAX_DEGREE, MAX_HORIZON, MIN_DEGREE, MIN_HORIZON,
        },
        symbols,
    },
    session::SessionHandle,
    AppState,
};

use super::{fmt2, partial, section_page};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectionQuery {
    pub symbol: Option<String>,
    pub period: Option<String>,
    pub degree: Option<String>,
    pub horizon: Option<String>,
}

/// Trends are fitted on daily closes; a year is the default window.
const DEFAULT_PERIOD: Period = Period::OneYear;

// GET /predictions (SSR page)
pub async fn get_predictions_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let symbol = session.lock().await.selection.symbol.clone();

    let periods: Vec<serde_json::Value> = Period::ALL
        .iter()
        .map(|p| json!({ "value": p.as_str(), "selected": *p == DEFAULT_PERIOD }))
        .collect();

    let ctx = json!({
        "symbol": symbol,
        "periods": periods,
        "degree": DEFAULT_DEGREE,
        "min_degree": MIN_DEGREE,
        "max_degree": MAX_DEGREE,
        "horizon": DEFAULT_HORIZON,
        "min_horizon": MIN_HORIZON,
        "max_horizon": MAX_HORIZON,
    });
    section_page(&state, &headers, Section::Predictions, &ctx)
}

async fn run(state: &AppState, raw: &str, q: &ProjectionQuery) -> Result<serde_json::Value, AppError> {
    let resolved = symbols::resolve(&symbols::normalize(raw))?;
    let sym = resolved.symbol;

    let period = q.period.as_deref().and_then(Period::parse).unwrap_or(DEFAULT_PERIOD);
    let degree = q
        .degree
        .as_deref()
        .and_then(|d| d.trim().parse().ok())
        .unwrap_or(DEFAULT_DEGREE);
    let horizon = q
        .horizon
        .as_deref()
        .and_then(|h| h.trim().parse().ok())
        .unwrap_or(DEFAULT_HORIZON);

    let history = match fetch_history(state.market.as_ref(), &sym, period, Interval::OneDay).await {
        HistoryFetch::Fetched(h) if !h.is_empty() => h,
        HistoryFetch::Failed(reason) => return Err(AppError::Provider(reason)),
        _ => return Err(AppError::NoData(sym)),
    };

    let closes = history.closes();
    let projection = projection_service::fit(&closes, degree, horizon)?;

    let last_close = history.last_close();
    let target = projection.last_forecast().unwrap_or(last_close);
    let change_pct = if last_close != 0.0 {
        (target - last_close) / last_close * 100.0
    } else {
        0.0
    };

    let chart = json!({
        "symbol": sym,
        "close": closes,
        "fitted": projection.fitted,
        "forecast": projection.forecast,
    });

    let messages: Vec<serde_json::Value> = resolved
        .note
        .map(|n| flash("text-info", n))
        .into_iter()
        .collect();

    Ok(json!({
        "messages": messages,
        "symbol": sym,
        "period": period.as_str(),
        "degree": projection.degree,
        "horizon": projection.horizon,
        "bars": closes.len(),
        "last_close": format_currency(last_close, &sym),
        "target": format_currency(target, &sym),
        "change_pct": format!("{:+.2}%", change_pct),
        "change_class": profit_class(change_pct),
        "r_squared": fmt2(projection.r_squared),
        "chart_json": chart.to_string(),
    }))
}

// GET /predictions/run (HTMX partial)
pub async fn get_projection(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Query(q): Query<ProjectionQuery>,
) -> Response {
    let raw = match q.symbol.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(s) => s.to_string(),
        None => session.lock().await.selection.symbol.clone(),
    };

    let ctx = match run(&state, &raw, &q).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::debug!("projection for {} failed: {}", raw, e);
            json!({ "messages": [error_flash(&e)] })
        }
    };

    partial(&state, "partials/projection", &ctx)
}
