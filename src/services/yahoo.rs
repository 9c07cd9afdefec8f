use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{Bar, Interval, Period, SymbolInfo},
};

use super::market_data::MarketData;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) BourseTracker/0.1";

/// Yahoo Finance chart and quote-summary endpoints.
#[derive(Clone)]
pub struct YahooClient {
    http: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(base_url: String) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn chart(&self, symbol: &str, period: Period, interval: Interval) -> Result<ChartResponse, AppError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let res = self
            .http
            .get(&url)
            .query(&[("range", period.as_str()), ("interval", interval.as_str())])
            .send()
            .await?;

        // Unknown symbols come back as 404 with a JSON error body.
        let status = res.status();
        let body: ChartResponse = res.json().await.map_err(|e| {
            AppError::Provider(format!("Yahoo chart failed: {status} {e}"))
        })?;
        Ok(body)
    }

    async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummaryResponse, AppError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let res = self
            .http
            .get(&url)
            .query(&[("modules", "price,assetProfile,summaryDetail,defaultKeyStatistics")])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!("Yahoo quoteSummary failed: {status} {body}")));
        }

        res.json::<QuoteSummaryResponse>().await.map_err(AppError::from)
    }
}

#[async_trait]
impl MarketData for YahooClient {
    async fn history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, AppError> {
        let chart = self.chart(symbol, period, interval).await?.chart;

        if let Some(err) = chart.error {
            return Err(AppError::UnknownSymbol(format!("{symbol} ({})", err.description)));
        }

        let Some(result) = chart.result.and_then(|r| r.into_iter().next()) else {
            return Err(AppError::NoData(symbol.to_string()));
        };

        let bars = result.into_bars();
        if bars.is_empty() {
            return Err(AppError::NoData(symbol.to_string()));
        }
        Ok(bars)
    }

    async fn info(&self, symbol: &str) -> Result<Option<SymbolInfo>, AppError> {
        let summary = self.quote_summary(symbol).await?.quote_summary;
        Ok(summary
            .result
            .and_then(|r| r.into_iter().next())
            .map(QuoteSummaryResult::into_info))
    }
}

// ---------------- wire types ----------------

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl ChartResult {
    /// Zip the column arrays into bars. Rows with a missing price are
    /// dropped; a missing volume counts as zero.
    pub fn into_bars(self) -> Vec<Bar> {
        let Some(q) = self.indicators.quote.into_iter().next() else {
            return Vec::new();
        };

        let col = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| {
                Some(Bar {
                    time: DateTime::from_timestamp(*ts, 0)?,
                    open: col(&q.open, i)?,
                    high: col(&q.high, i)?,
                    low: col(&q.low, i)?,
                    close: col(&q.close, i)?,
                    volume: col(&q.volume, i).unwrap_or(0.0),
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryEnvelope {
    pub result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawValue {
    pub raw: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(default)]
    pub asset_profile: Option<AssetProfile>,
    #[serde(default)]
    pub summary_detail: Option<SummaryDetail>,
    #[serde(default)]
    pub default_key_statistics: Option<KeyStatistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssetProfile {
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<RawValue>,
    pub dividend_yield: Option<RawValue>,
    pub beta: Option<RawValue>,
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyStatistics {
    pub beta: Option<RawValue>,
}

impl QuoteSummaryResult {
    pub fn into_info(self) -> SymbolInfo {
        let raw = |v: Option<RawValue>| v.and_then(|r| r.raw);

        let price = self.price.unwrap_or_default();
        let profile = self.asset_profile.unwrap_or_default();
        let detail = self.summary_detail.unwrap_or_default();
        let stats = self.default_key_statistics.unwrap_or_default();

        SymbolInfo {
            long_name: price.long_name.or(price.short_name),
            sector: profile.sector,
            industry: profile.industry,
            website: profile.website,
            market_cap: raw(price.market_cap).or(raw(detail.market_cap)),
            trailing_pe: raw(detail.trailing_pe),
            dividend_yield: raw(detail.dividend_yield),
            beta: raw(detail.beta).or(raw(stats.beta)),
        }
    }
}
