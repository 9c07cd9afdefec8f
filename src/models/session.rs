use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::symbols::DEFAULT_WATCHLIST;

use super::{AlertBook, EmailConfig, Interval, Period, PortfolioPosition};

/// A fired alert, kept for the notifications page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub symbol: String,
    pub message: String,
    pub price: f64,
    pub emailed: bool,
    pub at: DateTime<Utc>,
}

/// What the dashboard currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub symbol: String,
    pub period: Period,
    pub interval: Interval,
}

impl Selection {
    pub fn new(symbol: &str) -> Self {
        let period = Period::default();
        Self {
            symbol: symbol.to_string(),
            period,
            interval: period.default_interval(),
        }
    }
}

/// Everything one browser session owns. Lives in memory only.
#[derive(Debug, Clone)]
pub struct Session {
    pub watchlist: Vec<String>,
    pub portfolio: BTreeMap<String, Vec<PortfolioPosition>>,
    pub alerts: AlertBook,
    pub email: EmailConfig,
    pub notifications: Vec<Notification>,
    pub selection: Selection,
}

impl Session {
    pub fn new(default_symbol: &str) -> Self {
        Self {
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
            portfolio: BTreeMap::new(),
            alerts: AlertBook::default(),
            email: EmailConfig::default(),
            notifications: Vec::new(),
            selection: Selection::new(default_symbol),
        }
    }

    /// Appends to the watchlist once. Returns true when the symbol was new.
    pub fn watch(&mut self, symbol: &str) -> bool {
        if self.watchlist.iter().any(|s| s == symbol) {
            return false;
        }
        self.watchlist.push(symbol.to_string());
        true
    }

    pub fn add_position(&mut self, position: PortfolioPosition) {
        self.portfolio
            .entry(position.symbol.clone())
            .or_default()
            .push(position);
    }
}
