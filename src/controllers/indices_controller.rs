use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::Period,
    sections::Section,
    services::{indices_service, portfolio_service::profit_class},
    AppState,
};

use super::{fmt2, partial, section_page};

#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    pub period: Option<String>,
}

const DEFAULT_PERIOD: Period = Period::OneMonth;

// GET /indices (SSR page)
pub async fn get_indices_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let periods: Vec<serde_json::Value> = Period::ALL
        .iter()
        .map(|p| json!({ "value": p.as_str(), "selected": *p == DEFAULT_PERIOD }))
        .collect();

    section_page(&state, &headers, Section::Indices, &json!({ "periods": periods }))
}

// GET /indices/compare (HTMX partial)
pub async fn get_indices_compare(
    State(state): State<AppState>,
    Query(q): Query<CompareQuery>,
) -> Response {
    let period = q.period.as_deref().and_then(Period::parse).unwrap_or(DEFAULT_PERIOD);
    let results = indices_service::compare(&state, period).await;

    let rows: Vec<serde_json::Value> = results
        .iter()
        .map(|p| {
            let pct = p.performance_pct.unwrap_or(0.0);
            json!({
                "symbol": p.symbol,
                "name": p.name,
                "last": p.last.map(fmt2).unwrap_or_else(|| "N/A".to_string()),
                "performance_pct": p.performance_pct.map(|v| format!("{v:+.2}%")),
                "class": profit_class(pct),
                "error": p.error,
            })
        })
        .collect();

    let series: Vec<serde_json::Value> = results
        .iter()
        .filter(|p| !p.rebased.is_empty())
        .map(|p| json!({ "name": p.name, "values": p.rebased }))
        .collect();

    let ctx = json!({
        "period": period.as_str(),
        "rows": rows,
        "chart_json": json!({ "series": series }).to_string(),
        "has_series": !series.is_empty(),
    });
    partial(&state, "partials/indices_table", &ctx)
}
