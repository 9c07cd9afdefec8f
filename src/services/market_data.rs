use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{Bar, Interval, Period, SymbolInfo},
};

use super::history::History;

/// Price history and company metadata provider.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, AppError>;

    async fn info(&self, symbol: &str) -> Result<Option<SymbolInfo>, AppError>;
}

/// Outcome of loading one series for a view section.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryFetch {
    NotFetched,
    Failed(String),
    Fetched(History),
}

impl HistoryFetch {
    pub fn history(&self) -> Option<&History> {
        match self {
            HistoryFetch::Fetched(h) => Some(h),
            _ => None,
        }
    }

    /// Fetched and non-empty.
    pub fn has_rows(&self) -> bool {
        self.history().is_some_and(|h| !h.is_empty())
    }
}

/// Fetch a series and classify the outcome. Provider errors are logged and
/// folded into `Failed`; they never propagate.
pub async fn fetch_history(
    market: &dyn MarketData,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> HistoryFetch {
    match market.history(symbol, period, interval).await {
        Ok(bars) => HistoryFetch::Fetched(History::new(symbol, bars)),
        Err(e) => {
            tracing::warn!("history fetch failed for {}: {}", symbol, e);
            HistoryFetch::Failed(e.to_string())
        }
    }
}

/// Metadata or `None`, whatever went wrong.
pub async fn fetch_info(market: &dyn MarketData, symbol: &str) -> Option<SymbolInfo> {
    match market.info(symbol).await {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!("info fetch failed for {}: {}", symbol, e);
            None
        }
    }
}

type HistoryKey = (String, Period, Interval);

/// TTL memoisation in front of another provider. Only successes are kept.
pub struct CachedMarketData<M> {
    inner: M,
    ttl: Duration,
    histories: Mutex<HashMap<HistoryKey, (Instant, Vec<Bar>)>>,
    infos: Mutex<HashMap<String, (Instant, Option<SymbolInfo>)>>,
}

impl<M: MarketData> CachedMarketData<M> {
    pub fn new(inner: M, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            histories: Mutex::new(HashMap::new()),
            infos: Mutex::new(HashMap::new()),
        }
    }

    fn fresh(&self, stored: Instant) -> bool {
        stored.elapsed() < self.ttl
    }
}

#[async_trait]
impl<M: MarketData> MarketData for CachedMarketData<M> {
    async fn history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, AppError> {
        let key = (symbol.to_string(), period, interval);

        if let Ok(map) = self.histories.lock() {
            if let Some((at, bars)) = map.get(&key) {
                if self.fresh(*at) {
                    tracing::debug!("cache hit: {} {} {}", symbol, period.as_str(), interval.as_str());
                    return Ok(bars.clone());
                }
            }
        }

        tracing::debug!("cache miss: {} {} {}", symbol, period.as_str(), interval.as_str());
        let bars = self.inner.history(symbol, period, interval).await?;

        if let Ok(mut map) = self.histories.lock() {
            map.retain(|_, (at, _)| at.elapsed() < self.ttl);
            map.insert(key, (Instant::now(), bars.clone()));
        }
        Ok(bars)
    }

    async fn info(&self, symbol: &str) -> Result<Option<SymbolInfo>, AppError> {
        if let Ok(map) = self.infos.lock() {
            if let Some((at, info)) = map.get(symbol) {
                if self.fresh(*at) {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.inner.info(symbol).await?;

        if let Ok(mut map) = self.infos.lock() {
            map.retain(|_, (at, _)| at.elapsed() < self.ttl);
            map.insert(symbol.to_string(), (Instant::now(), info.clone()));
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl MarketData for Counting {
        async fn history(&self, symbol: &str, _: Period, _: Interval) -> Result<Vec<Bar>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::UnknownSymbol(symbol.to_string()));
            }
            Ok(vec![Bar {
                time: Utc.with_ymd_and_hms(2024, 6, 12, 7, 0, 0).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 10.0,
            }])
        }

        async fn info(&self, _: &str) -> Result<Option<SymbolInfo>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[tokio::test]
    async fn second_call_within_ttl_is_served_from_cache() {
        let cached = CachedMarketData::new(
            Counting { calls: AtomicUsize::new(0), fail: false },
            Duration::from_secs(300),
        );
        cached.history("MC.PA", Period::OneMonth, Interval::OneDay).await.unwrap();
        cached.history("MC.PA", Period::OneMonth, Interval::OneDay).await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);

        cached.history("MC.PA", Period::OneYear, Interval::OneDay).await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_pruned_on_insert() {
        let cached = CachedMarketData::new(
            Counting { calls: AtomicUsize::new(0), fail: false },
            Duration::ZERO,
        );
        cached.info("MC.PA").await.unwrap();
        cached.info("AI.PA").await.unwrap();
        cached.history("MC.PA", Period::OneMonth, Interval::OneDay).await.unwrap();
        cached.history("AI.PA", Period::OneMonth, Interval::OneDay).await.unwrap();

        assert_eq!(cached.infos.lock().unwrap().len(), 1);
        assert_eq!(cached.histories.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cached = CachedMarketData::new(
            Counting { calls: AtomicUsize::new(0), fail: true },
            Duration::from_secs(300),
        );
        assert!(cached.history("XX", Period::OneDay, Interval::OneHour).await.is_err());
        assert!(cached.history("XX", Period::OneDay, Interval::OneHour).await.is_err());
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_history_folds_errors() {
        let market = Counting { calls: AtomicUsize::new(0), fail: true };
        let res = fetch_history(&market, "XX", Period::OneDay, Interval::OneHour).await;
        assert!(matches!(res, HistoryFetch::Failed(_)));
        assert!(!res.has_rows());
    }
}
