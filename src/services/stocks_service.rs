use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppError,
    models::{Interval, Period, Selection, SymbolInfo},
    render::{error_flash, flash},
    session::SessionHandle,
    AppState,
};

use super::{
    alerts_service,
    exchange::{classify, Currency},
    history::{format_volume, paris_time, History},
    market_data::{fetch_history, fetch_info, HistoryFetch},
    portfolio_service::profit_class,
    symbols,
};

pub const MIN_REFRESH_SECS: u64 = 5;
pub const MAX_REFRESH_SECS: u64 = 60;
const REFRESH_STEP: u64 = 5;

/// Dashboard selector as submitted by the browser. Everything is optional;
/// missing values fall back to the session's current selection.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub symbol: Option<String>,
    pub period: Option<String>,
    pub interval: Option<String>,
    pub custom: Option<String>,
    pub refresh: Option<String>,
}

/// Auto-refresh delay in seconds. Empty, zero or garbage turns it off;
/// anything else is snapped to a multiple of 5 within 5..=60.
pub fn refresh_secs(raw: Option<&str>) -> Option<u64> {
    let secs: u64 = raw?.trim().parse().ok()?;
    if secs == 0 {
        return None;
    }
    let secs = secs.min(MAX_REFRESH_SECS);
    let snapped = (secs + REFRESH_STEP / 2) / REFRESH_STEP * REFRESH_STEP;
    Some(snapped.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS))
}

/// Apply the query on top of the current selection. A new period without an
/// explicit interval picks that period's default interval.
fn next_selection(current: &Selection, q: &DashboardQuery) -> (String, Period, Interval, bool) {
    let custom = q
        .custom
        .as_deref()
        .map(symbols::normalize)
        .filter(|s| !s.is_empty());
    let is_custom = custom.is_some();

    let raw = custom
        .or_else(|| {
            q.symbol
                .as_deref()
                .map(symbols::normalize)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| current.symbol.clone());

    let period = q
        .period
        .as_deref()
        .and_then(Period::parse)
        .unwrap_or(current.period);

    let interval = match q.interval.as_deref().and_then(Interval::parse) {
        Some(i) => i,
        None if period != current.period => period.default_interval(),
        None => current.interval,
    };

    (raw, period, interval, is_custom)
}

fn selectors(period: Period, interval: Interval, refresh: Option<u64>) -> Value {
    let periods: Vec<Value> = Period::ALL
        .iter()
        .map(|p| json!({ "value": p.as_str(), "selected": *p == period }))
        .collect();

    let intervals: Vec<Value> = Interval::ALL
        .iter()
        .map(|i| json!({ "value": i.as_str(), "label": i.label(), "selected": *i == interval }))
        .collect();

    let refresh_options: Vec<Value> = (MIN_REFRESH_SECS..=MAX_REFRESH_SECS)
        .step_by(REFRESH_STEP as usize)
        .map(|s| json!({ "value": s, "selected": Some(s) == refresh }))
        .collect();

    json!({
        "periods": periods,
        "intervals": intervals,
        "refresh_options": refresh_options,
    })
}

/// Watchlist entries for the symbol `<select>`.
pub fn symbol_options(watchlist: &[String], selected: &str) -> Vec<Value> {
    watchlist
        .iter()
        .filter(|s| !symbols::is_retired(s))
        .map(|s| {
            let label = match symbols::display_name(s) {
                Some(name) => format!("{s} - {name}"),
                None => s.clone(),
            };
            json!({ "value": s, "label": label, "selected": s == selected })
        })
        .collect()
}

pub fn metrics(history: &History, currency: Currency) -> Value {
    let last = history.last();
    let change = history.change();

    json!({
        "price": currency.format(history.last_close()),
        "change": currency.format(change),
        "change_pct": format!("{:+.2}%", history.change_pct()),
        "change_class": profit_class(change),
        "high": last.map(|b| currency.format(b.high)),
        "low": last.map(|b| currency.format(b.low)),
        "volume": last.map(|b| format_volume(b.volume)),
        "updated": history.last_updated().map(paris_time),
    })
}

/// Series handed to the client-side chart. Intraday intervals are drawn as
/// candlesticks, longer ones as a close line.
pub fn chart_data(history: &History, interval: Interval) -> Value {
    let bars = &history.bars;
    json!({
        "symbol": history.symbol,
        "kind": if interval.is_intraday() { "candlestick" } else { "line" },
        "times": bars.iter().map(|b| paris_time(b.time)).collect::<Vec<_>>(),
        "open": bars.iter().map(|b| b.open).collect::<Vec<_>>(),
        "high": bars.iter().map(|b| b.high).collect::<Vec<_>>(),
        "low": bars.iter().map(|b| b.low).collect::<Vec<_>>(),
        "close": history.closes(),
        "volume": bars.iter().map(|b| b.volume).collect::<Vec<_>>(),
        "ma20": history.moving_average(20),
        "ma50": history.moving_average(50),
    })
}

fn or_na(v: Option<String>) -> String {
    v.filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Label/value rows of the company information block.
pub fn info_rows(symbol: &str, info: &SymbolInfo) -> Vec<Value> {
    let (exchange, currency) = classify(symbol);

    let market_cap = info
        .market_cap
        .filter(|c| *c > 0.0)
        .map(|c| currency.format_whole(c));

    let rows = [
        ("Name", or_na(info.long_name.clone())),
        ("Sector", or_na(info.sector.clone())),
        ("Industry", or_na(info.industry.clone())),
        ("Website", or_na(info.website.clone())),
        ("Exchange", exchange.name().to_string()),
        ("Currency", currency.code().to_string()),
        ("Market cap", or_na(market_cap)),
        ("P/E", or_na(info.trailing_pe.map(|v| format!("{v:.2}")))),
        (
            "Dividend yield",
            or_na(info.dividend_yield.map(|v| format!("{:.2}%", v * 100.0))),
        ),
        ("Beta", or_na(info.beta.map(|v| format!("{v:.2}")))),
    ];

    rows.into_iter()
        .map(|(label, value)| json!({ "label": label, "value": value }))
        .collect()
}

/// Build the context used by the `partials/dashboard_panel` template.
///
/// Resolution problems and provider failures never escape: they become
/// messages on the panel and the affected blocks are left out.
pub async fn dashboard_ctx(state: &AppState, session: &SessionHandle, q: &DashboardQuery) -> Value {
    let (current, watchlist) = {
        let s = session.lock().await;
        (s.selection.clone(), s.watchlist.clone())
    };

    let (raw, period, interval, is_custom) = next_selection(&current, q);
    let refresh = refresh_secs(q.refresh.as_deref());
    let mut messages: Vec<Value> = Vec::new();

    let resolved = match symbols::resolve(&raw) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("rejected symbol {}: {}", raw, e);
            messages.push(error_flash(&e));
            return json!({
                "symbol": raw,
                "options": symbol_options(&watchlist, &current.symbol),
                "selectors": selectors(period, interval, refresh),
                "refresh": refresh,
                "messages": messages,
                "has_data": false,
            });
        }
    };

    let sym = resolved.symbol;
    if let Some(note) = resolved.note {
        messages.push(flash("text-info", note));
    }

    session.lock().await.selection = Selection {
        symbol: sym.clone(),
        period,
        interval,
    };

    let mut watchlist_changed = false;
    if is_custom {
        let probe = fetch_history(state.market.as_ref(), &sym, Period::OneDay, Interval::OneDay).await;
        if probe.has_rows() {
            watchlist_changed = session.lock().await.watch(&sym);
            if watchlist_changed {
                messages.push(flash("text-success", format!("{sym} added to the watchlist")));
            }
        } else {
            messages.push(flash(
                "text-warning",
                format!("{sym} returned no data and was not added to the watchlist"),
            ));
        }
    }

    let (fetch, info) = tokio::join!(
        fetch_history(state.market.as_ref(), &sym, period, interval),
        fetch_info(state.market.as_ref(), &sym),
    );

    let history = match &fetch {
        HistoryFetch::Fetched(h) if !h.is_empty() => Some(h),
        HistoryFetch::Fetched(_) => {
            messages.push(error_flash(&AppError::NoData(sym.clone())));
            None
        }
        HistoryFetch::Failed(reason) => {
            messages.push(flash("text-warning", format!("No data available for {sym} ({reason})")));
            None
        }
        HistoryFetch::NotFetched => None,
    };

    if history.is_none() {
        if let Some(hint) = symbols::suggestion(&raw).or_else(|| symbols::suggestion(&sym)) {
            messages.push(flash("text-info", hint));
        }
    }

    let price = history.map(History::last_close).unwrap_or(0.0);
    let fired = alerts_service::process_price(state, session, &sym, price).await;
    for n in &fired {
        let suffix = if n.emailed { " (email queued)" } else { "" };
        messages.push(flash("text-warning", format!("{}{}", n.message, suffix)));
    }

    let (exchange, currency) = classify(&sym);
    let watchlist = session.lock().await.watchlist.clone();

    json!({
        "symbol": sym,
        "display_name": symbols::display_name(&sym),
        "exchange": exchange.name(),
        "currency": currency.code(),
        "period": period.as_str(),
        "interval": interval.as_str(),
        "options": symbol_options(&watchlist, &sym),
        "selectors": selectors(period, interval, refresh),
        "refresh": refresh,
        "messages": messages,
        "has_data": history.is_some(),
        "metrics": history.map(|h| metrics(h, currency)),
        "chart_json": history.map(|h| chart_data(h, interval).to_string()),
        "has_info": info.is_some(),
        "info_rows": info.as_ref().map(|i| info_rows(&sym, i)),
        "alerts_fired": fired.len(),
        "watchlist_changed": watchlist_changed,
    })
}

fn tile(symbol: &str, fetch: &HistoryFetch) -> Value {
    let label = symbols::short_label(symbol);
    let currency = classify(symbol).1;

    match fetch {
        HistoryFetch::Failed(_) => json!({ "symbol": symbol, "label": label, "price": "Err", "class": "text-danger" }),
        HistoryFetch::Fetched(h) if h.len() >= 2 => {
            let change = h.change();
            json!({
                "symbol": symbol,
                "label": label,
                "price": currency.format(h.last_close()),
                "change": currency.format(change),
                "change_pct": format!("{:+.2}%", h.change_pct()),
                "class": profit_class(change),
            })
        }
        HistoryFetch::Fetched(h) if h.len() == 1 => json!({
            "symbol": symbol,
            "label": label,
            "price": currency.format(h.last_close()),
            "class": "text-muted",
        }),
        _ => json!({ "symbol": symbol, "label": label, "price": "N/A", "class": "text-muted" }),
    }
}

/// Build the context used by the `partials/watchlist` template. Each symbol
/// is fetched concurrently and degrades on its own.
pub async fn watchlist_ctx(state: &AppState, session: &SessionHandle) -> Value {
    let watched: Vec<String> = session
        .lock()
        .await
        .watchlist
        .iter()
        .filter(|s| !symbols::is_retired(s))
        .cloned()
        .collect();

    let fetches = watched.iter().map(|sym| async move {
        fetch_history(state.market.as_ref(), sym, Period::FiveDays, Interval::OneDay).await
    });
    let results = join_all(fetches).await;

    let tiles: Vec<Value> = watched
        .iter()
        .zip(results.iter())
        .map(|(sym, res)| tile(sym, res))
        .collect();

    json!({ "tiles": tiles, "has_tiles": !tiles.is_empty() })
}
