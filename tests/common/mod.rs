#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{header, Request};
use boursetracker::{
    config::Settings,
    error::AppError,
    models::{Bar, Interval, Period, SymbolInfo},
    services::{mailer::OutboxMailer, market_data::MarketData},
    session::{new_handle, SessionHandle},
    AppState,
};
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;

/// Canned provider: known symbols return their bars, anything else is
/// rejected the way the real provider rejects unknown tickers.
#[derive(Default)]
pub struct StubMarket {
    pub series: HashMap<String, Vec<Bar>>,
    pub info: HashMap<String, SymbolInfo>,
    pub calls: Mutex<Vec<String>>,
}

impl StubMarket {
    pub fn with(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.series.insert(symbol.to_string(), bars(closes));
        self
    }

    pub fn with_info(mut self, symbol: &str, info: SymbolInfo) -> Self {
        self.info.insert(symbol.to_string(), info);
        self
    }

    pub fn fetched(&self, symbol: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|s| s == symbol)
    }
}

#[async_trait]
impl MarketData for StubMarket {
    async fn history(&self, symbol: &str, _: Period, _: Interval) -> Result<Vec<Bar>, AppError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| AppError::UnknownSymbol(symbol.to_string()))
    }

    async fn info(&self, symbol: &str) -> Result<Option<SymbolInfo>, AppError> {
        Ok(self.info.get(symbol).cloned())
    }
}

pub fn bars(closes: &[f64]) -> Vec<Bar> {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| Bar {
            time: t0 + Duration::days(i as i64),
            open: *c,
            high: c + 1.0,
            low: c - 1.0,
            close: *c,
            volume: 1_000.0,
        })
        .collect()
}

pub struct TestApp {
    pub state: AppState,
    pub market: Arc<StubMarket>,
    pub outbox: OutboxMailer,
    pub session: SessionHandle,
}

pub fn test_app(market: StubMarket) -> TestApp {
    let market = Arc::new(market);
    let outbox = OutboxMailer::new();
    let settings = Settings::default();
    let session = new_handle(&settings.default_symbol);

    let state = AppState::new(settings, market.clone(), Arc::new(outbox.clone()));
    TestApp { state, market, outbox, session }
}

pub fn get(uri: &str, session: &SessionHandle) -> Request<axum::body::Body> {
    let mut req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    req.extensions_mut().insert(session.clone());
    req
}

pub fn htmx_get(uri: &str, session: &SessionHandle) -> Request<axum::body::Body> {
    let mut req = get(uri, session);
    req.headers_mut().insert("HX-Request", "true".parse().unwrap());
    req
}

pub fn post_form(uri: &str, body: &str, session: &SessionHandle) -> Request<axum::body::Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();
    req.extensions_mut().insert(session.clone());
    req
}

pub async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

pub fn hx_trigger(res: &axum::response::Response) -> String {
    res.headers()
        .get("HX-Trigger")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
