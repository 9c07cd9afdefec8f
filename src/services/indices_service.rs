use futures_util::future::join_all;
use serde::Serialize;

use crate::{
    models::{Interval, Period},
    AppState,
};

use super::{
    history::History,
    market_data::{fetch_history, HistoryFetch},
};

pub const INDICES: &[(&str, &str)] = &[
    ("^FCHI", "CAC 40"),
    ("^SBF120", "SBF 120"),
    ("^STOXX50E", "Euro Stoxx 50"),
    ("^GDAXI", "DAX"),
    ("^FTSE", "FTSE 100"),
    ("^GSPC", "S&P 500"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexPerformance {
    pub symbol: String,
    pub name: String,
    pub last: Option<f64>,
    pub performance_pct: Option<f64>,
    /// Closes rebased so the first bar is 100.
    pub rebased: Vec<f64>,
    pub error: Option<String>,
}

/// Closes rebased to 100 at the first bar. Empty when the first close is 0.
pub fn rebase(closes: &[f64]) -> Vec<f64> {
    match closes.first() {
        Some(first) if *first != 0.0 => closes.iter().map(|c| c / first * 100.0).collect(),
        _ => Vec::new(),
    }
}

pub fn performance(symbol: &str, name: &str, fetch: HistoryFetch) -> IndexPerformance {
    let empty = |error: String| IndexPerformance {
        symbol: symbol.to_string(),
        name: name.to_string(),
        last: None,
        performance_pct: None,
        rebased: Vec::new(),
        error: Some(error),
    };

    let history: History = match fetch {
        HistoryFetch::Fetched(h) if !h.is_empty() => h,
        HistoryFetch::Fetched(_) | HistoryFetch::NotFetched => return empty("No data".to_string()),
        HistoryFetch::Failed(e) => return empty(e),
    };

    let rebased = rebase(&history.closes());
    IndexPerformance {
        symbol: symbol.to_string(),
        name: name.to_string(),
        last: Some(history.last_close()),
        performance_pct: rebased.last().map(|v| v - 100.0),
        rebased,
        error: None,
    }
}

/// All tracked indices over `period`; each degrades to "no data" on its own.
pub async fn compare(state: &AppState, period: Period) -> Vec<IndexPerformance> {
    let fetches = INDICES.iter().map(|(symbol, name)| async move {
        let fetch = fetch_history(state.market.as_ref(), symbol, period, Interval::OneDay).await;
        performance(symbol, name, fetch)
    });
    join_all(fetches).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebase_starts_at_100() {
        assert_eq!(rebase(&[50.0, 75.0, 25.0]), vec![100.0, 150.0, 50.0]);
        assert!(rebase(&[]).is_empty());
        assert!(rebase(&[0.0, 1.0]).is_empty());
    }

    #[test]
    fn failed_fetch_keeps_the_reason() {
        let p = performance("^FCHI", "CAC 40", HistoryFetch::Failed("timeout".into()));
        assert_eq!(p.error.as_deref(), Some("timeout"));
        assert!(p.last.is_none());
    }
}
