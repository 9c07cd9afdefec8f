use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    models::{Interval, Period, Selection},
    render::error_flash,
    sections::Section,
    services::{
        exchange::format_currency,
        export_service,
        history::{format_volume, History},
        market_data::{fetch_history, fetch_info, HistoryFetch},
        symbols,
    },
    session::SessionHandle,
    AppState,
};

use super::{fmt2, partial, section_page};

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub symbol: Option<String>,
    pub period: Option<String>,
    pub interval: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

/// `MC.PA.csv` -> (`MC.PA`, Csv). The extension is whatever follows the last dot.
fn split_file(file: &str) -> Option<(&str, Format)> {
    let (symbol, ext) = file.rsplit_once('.')?;
    let format = match ext.to_ascii_lowercase().as_str() {
        "csv" => Format::Csv,
        "json" => Format::Json,
        _ => return None,
    };
    (!symbol.is_empty()).then_some((symbol, format))
}

fn pick(q: &ExportQuery, current: &Selection) -> (Period, Interval) {
    let period = q
        .period
        .as_deref()
        .and_then(Period::parse)
        .unwrap_or(current.period);
    let interval = q
        .interval
        .as_deref()
        .and_then(Interval::parse)
        .unwrap_or(current.interval);
    (period, interval)
}

async fn load(state: &AppState, raw: &str, period: Period, interval: Interval) -> Result<History, AppError> {
    let resolved = symbols::resolve(&symbols::normalize(raw))?;
    match fetch_history(state.market.as_ref(), &resolved.symbol, period, interval).await {
        HistoryFetch::Fetched(h) if !h.is_empty() => Ok(h),
        HistoryFetch::Failed(reason) => Err(AppError::Provider(reason)),
        _ => Err(AppError::NoData(resolved.symbol)),
    }
}

// GET /export (SSR page)
pub async fn get_export_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let current = session.lock().await.selection.clone();

    let periods: Vec<serde_json::Value> = Period::ALL
        .iter()
        .map(|p| json!({ "value": p.as_str(), "selected": *p == current.period }))
        .collect();
    let intervals: Vec<serde_json::Value> = Interval::ALL
        .iter()
        .map(|i| json!({ "value": i.as_str(), "label": i.label(), "selected": *i == current.interval }))
        .collect();

    let ctx = json!({
        "symbol": current.symbol,
        "periods": periods,
        "intervals": intervals,
    });
    section_page(&state, &headers, Section::Export, &ctx)
}

// GET /export/preview (HTMX partial): summary of what a download would hold
pub async fn get_export_preview(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Query(q): Query<ExportQuery>,
) -> Response {
    let current = session.lock().await.selection.clone();
    let raw = q.symbol.clone().unwrap_or_else(|| current.symbol.clone());
    let (period, interval) = pick(&q, &current);

    let ctx = match load(&state, &raw, period, interval).await {
        Ok(h) => {
            let stats = h.statistics();
            let sym = h.symbol.clone();
            json!({
                "symbol": sym,
                "period": period.as_str(),
                "interval": interval.as_str(),
                "stats": stats.map(|s| json!({
                    "bars": s.bars,
                    "first_close": format_currency(s.first_close, &sym),
                    "last_close": format_currency(s.last_close, &sym),
                    "period_return_pct": fmt2(s.period_return_pct),
                    "min_close": format_currency(s.min_close, &sym),
                    "max_close": format_currency(s.max_close, &sym),
                    "mean_close": format_currency(s.mean_close, &sym),
                    "average_volume": format_volume(s.average_volume),
                })),
            })
        }
        Err(e) => json!({ "messages": [error_flash(&e)] }),
    };

    partial(&state, "partials/export_preview", &ctx)
}

// GET /export/:file  (`{symbol}.csv` or `{symbol}.json`)
pub async fn get_export_file(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path(file): Path<String>,
    Query(q): Query<ExportQuery>,
) -> Response {
    let Some((raw, format)) = split_file(&file) else {
        return (StatusCode::NOT_FOUND, "Unsupported export format").into_response();
    };

    let current = session.lock().await.selection.clone();
    let (period, interval) = pick(&q, &current);

    let history = match load(&state, raw, period, interval).await {
        Ok(h) => h,
        Err(e) => {
            tracing::warn!("export of {} failed: {}", raw, e);
            let status = match e {
                AppError::DelistedSymbol { .. } => StatusCode::GONE,
                _ => StatusCode::NOT_FOUND,
            };
            return (status, e.to_string()).into_response();
        }
    };

    let (bytes, content_type, ext) = match format {
        Format::Csv => (export_service::to_csv(&history), "text/csv; charset=utf-8", "csv"),
        Format::Json => {
            let info = fetch_info(state.market.as_ref(), &history.symbol).await;
            (
                export_service::to_json(&history, info.as_ref()),
                "application/json",
                "json",
            )
        }
    };

    match bytes {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                export_service::file_name(&history.symbol, ext)
            );
            tracing::info!("exported {} bars of {} as {}", history.len(), history.symbol, ext);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
