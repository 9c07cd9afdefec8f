use std::collections::{BTreeMap, HashMap};

use futures_util::future::join_all;

use crate::{
    error::AppError,
    models::{Interval, Period, PortfolioPosition, Session},
    AppState,
};

use super::{
    exchange::{classify, Currency, Exchange},
    market_data::{fetch_history, HistoryFetch},
    symbols,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PositionView {
    pub symbol: String,
    pub exchange: Exchange,
    pub currency: Currency,
    pub shares: f64,
    pub buy_price: f64,
    pub current_price: Option<f64>,
    pub cost: f64,
    pub value: f64,
    pub profit: f64,
    pub profit_pct: f64,
    pub profit_class: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub cost: f64,
    pub value: f64,
}

impl Totals {
    pub fn profit(&self) -> f64 {
        self.value - self.cost
    }

    pub fn profit_pct(&self) -> f64 {
        if self.cost > 0.0 {
            self.profit() / self.cost * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioSummary {
    pub rows: Vec<PositionView>,
    pub totals: BTreeMap<Currency, Totals>,
    pub skipped: Vec<String>,
}

impl PortfolioSummary {
    /// Headline figures are quoted in euros.
    pub fn eur(&self) -> Totals {
        self.totals.get(&Currency::Eur).copied().unwrap_or_default()
    }
}

pub fn profit_class(profit: f64) -> &'static str {
    if profit > 0.0 {
        "text-success"
    } else if profit < 0.0 {
        "text-danger"
    } else {
        "text-muted"
    }
}

/// Per-lot rows and per-currency totals. `prices` holds the current price of
/// each symbol; a missing entry values the lot at zero.
pub fn summarize(
    portfolio: &BTreeMap<String, Vec<PortfolioPosition>>,
    prices: &HashMap<String, f64>,
) -> PortfolioSummary {
    let mut summary = PortfolioSummary::default();

    for (symbol, positions) in portfolio {
        if symbols::is_retired(symbol) {
            summary.skipped.push(symbol.clone());
            continue;
        }

        let (exchange, currency) = classify(symbol);
        let current = prices.get(symbol).copied().filter(|p| *p > 0.0);

        for pos in positions {
            let cost = pos.cost();
            let value = pos.shares * current.unwrap_or(0.0);
            let profit = value - cost;
            let profit_pct = if cost > 0.0 { profit / cost * 100.0 } else { 0.0 };

            let t = summary.totals.entry(currency).or_default();
            t.cost += cost;
            t.value += value;

            summary.rows.push(PositionView {
                symbol: symbol.clone(),
                exchange,
                currency,
                shares: pos.shares,
                buy_price: pos.buy_price,
                current_price: current,
                cost,
                value,
                profit,
                profit_pct,
                profit_class: profit_class(profit),
            });
        }
    }

    summary
}

/// Resolve, validate and append a lot to the session portfolio.
pub fn add_position(
    session: &mut Session,
    raw_symbol: &str,
    shares: f64,
    buy_price: f64,
) -> Result<(PortfolioPosition, Option<String>), AppError> {
    let symbol = symbols::normalize(raw_symbol);
    if symbol.is_empty() {
        return Err(AppError::InvalidInput("Symbol is required.".to_string()));
    }

    let resolved = symbols::resolve(&symbol)?;
    let position = PortfolioPosition::new(&resolved.symbol, shares, buy_price)?;
    session.add_position(position.clone());
    tracing::info!("position added: {} x{} @ {}", position.symbol, shares, buy_price);
    Ok((position, resolved.note))
}

pub fn clear(session: &mut Session) {
    session.portfolio.clear();
}

/// Latest close per held symbol; symbols without data are left out.
pub async fn current_prices(state: &AppState, held: &[String]) -> HashMap<String, f64> {
    let fetches = held.iter().map(|sym| async move {
        let res = fetch_history(state.market.as_ref(), sym, Period::OneDay, Interval::OneDay).await;
        (sym.clone(), res)
    });

    join_all(fetches)
        .await
        .into_iter()
        .filter_map(|(sym, res)| match res {
            HistoryFetch::Fetched(h) if !h.is_empty() => Some((sym, h.last_close())),
            _ => None,
        })
        .collect()
}
