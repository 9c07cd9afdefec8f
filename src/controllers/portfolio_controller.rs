use axum::{
    extract::{Extension, Form, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    render::{error_flash, flash},
    sections::Section,
    services::{exchange::Currency, portfolio_service, symbols},
    session::SessionHandle,
    AppState,
};

use super::{fmt2, hx_trigger_value, parse_amount, partial, section_page};

#[derive(Deserialize)]
pub struct AddPositionForm {
    pub symbol: String,
    pub shares: String,
    pub buy_price: String,
}

// GET /portfolio (SSR page)
pub async fn get_portfolio_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = json!({ "default_symbol": state.settings.default_symbol });
    section_page(&state, &headers, Section::Portfolio, &ctx)
}

/// Context for `partials/portfolio_positions`, valued at the latest closes.
async fn positions_ctx(
    state: &AppState,
    session: &SessionHandle,
    messages: Vec<serde_json::Value>,
) -> serde_json::Value {
    let portfolio = session.lock().await.portfolio.clone();
    let held: Vec<String> = portfolio
        .keys()
        .filter(|s| !symbols::is_retired(s))
        .cloned()
        .collect();

    let prices = portfolio_service::current_prices(state, &held).await;
    let summary = portfolio_service::summarize(&portfolio, &prices);

    let rows: Vec<serde_json::Value> = summary
        .rows
        .iter()
        .map(|r| {
            json!({
                "symbol": r.symbol,
                "exchange": r.exchange.name(),
                "currency": r.currency.code(),
                "shares": r.shares,
                "buy_price": r.currency.format(r.buy_price),
                "current_price": r.current_price
                    .map(|p| r.currency.format(p))
                    .unwrap_or_else(|| "N/A".to_string()),
                "cost": r.currency.format(r.cost),
                "value": r.currency.format(r.value),
                "profit": r.currency.format(r.profit),
                "profit_pct": fmt2(r.profit_pct),
                "profit_class": r.profit_class,
            })
        })
        .collect();

    let totals: Vec<serde_json::Value> = summary
        .totals
        .iter()
        .map(|(cur, t)| {
            json!({
                "currency": cur.code(),
                "cost": cur.format(t.cost),
                "value": cur.format(t.value),
                "profit": cur.format(t.profit()),
                "profit_pct": fmt2(t.profit_pct()),
                "profit_class": portfolio_service::profit_class(t.profit()),
            })
        })
        .collect();

    let eur = summary.eur();

    json!({
        "messages": messages,
        "rows": rows,
        "has_rows": !rows.is_empty(),
        "headline": {
            "cost": Currency::Eur.format(eur.cost),
            "value": Currency::Eur.format(eur.value),
            "profit": Currency::Eur.format(eur.profit()),
            "profit_pct": fmt2(eur.profit_pct()),
            "profit_class": portfolio_service::profit_class(eur.profit()),
        },
        "totals": totals,
        "skipped": summary.skipped,
    })
}

// GET /portfolio/positions (HTMX partial)
pub async fn get_portfolio_positions(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let ctx = positions_ctx(&state, &session, vec![]).await;
    partial(&state, "partials/portfolio_positions", &ctx)
}

// POST /portfolio
pub async fn post_add_position(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<AddPositionForm>,
) -> Response {
    let shares = parse_amount(&form.shares)
        .ok_or_else(|| AppError::InvalidInput("Shares must be a number.".to_string()));
    let buy = parse_amount(&form.buy_price)
        .ok_or_else(|| AppError::InvalidInput("Buy price must be a number.".to_string()));

    let outcome = match (shares, buy) {
        (Ok(shares), Ok(buy)) => {
            let mut s = session.lock().await;
            portfolio_service::add_position(&mut s, &form.symbol, shares, buy)
        }
        (Err(e), _) | (_, Err(e)) => Err(e),
    };

    let mut messages = Vec::new();
    let added = match outcome {
        Ok((pos, note)) => {
            if let Some(note) = note {
                messages.push(flash("text-info", note));
            }
            messages.push(flash(
                "text-success",
                format!("Added {} shares of {}", pos.shares, pos.symbol),
            ));
            true
        }
        Err(e) => {
            tracing::debug!("position rejected: {}", e);
            messages.push(error_flash(&e));
            false
        }
    };

    let ctx = positions_ctx(&state, &session, messages).await;
    let mut res = partial(&state, "partials/portfolio_positions", &ctx);
    if added {
        res.headers_mut()
            .insert("HX-Trigger", hx_trigger_value(&["portfolioUpdated"]));
    }
    res
}

// POST /portfolio/clear
pub async fn post_clear_portfolio(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    portfolio_service::clear(&mut *session.lock().await);
    tracing::info!("portfolio cleared");

    let ctx = positions_ctx(&state, &session, vec![flash("text-info", "Portfolio cleared")]).await;
    partial(&state, "partials/portfolio_positions", &ctx)
}
