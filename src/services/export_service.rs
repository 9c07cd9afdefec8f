use serde::Serialize;

use crate::{error::AppError, models::SymbolInfo};

use super::{
    exchange::classify,
    history::{paris_time, History, Statistics},
};

#[derive(Debug, Serialize)]
struct BarRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    symbol: &'a str,
    exchange: &'static str,
    currency: &'static str,
    info: Option<&'a SymbolInfo>,
    statistics: Option<Statistics>,
    history: Vec<BarRow>,
}

fn rows(history: &History) -> Vec<BarRow> {
    history
        .bars
        .iter()
        .map(|b| BarRow {
            timestamp: paris_time(b.time),
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        })
        .collect()
}

/// `timestamp,open,high,low,close,volume`, timestamps in Paris time.
pub fn to_csv(history: &History) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows(history) {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))
}

pub fn to_json(history: &History, info: Option<&SymbolInfo>) -> Result<Vec<u8>, AppError> {
    let (exchange, currency) = classify(&history.symbol);
    let snapshot = Snapshot {
        symbol: &history.symbol,
        exchange: exchange.name(),
        currency: currency.code(),
        info,
        statistics: history.statistics(),
        history: rows(history),
    };
    Ok(serde_json::to_vec_pretty(&snapshot)?)
}

pub fn file_name(symbol: &str, ext: &str) -> String {
    let safe: String = symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}.{}", safe, chrono::Utc::now().format("%Y%m%d"), ext)
}
