use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Bar;

use super::market_clock::PARIS_TZ;

/// A fetched series for one symbol, oldest bar first.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

/// Summary figures used by the export snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub bars: usize,
    pub first_close: f64,
    pub last_close: f64,
    pub period_return_pct: f64,
    pub min_close: f64,
    pub max_close: f64,
    pub mean_close: f64,
    pub average_volume: f64,
}

impl History {
    pub fn new(symbol: &str, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.time);
        Self {
            symbol: symbol.to_string(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Last close, 0 for an empty series.
    pub fn last_close(&self) -> f64 {
        self.last().map(|b| b.close).unwrap_or(0.0)
    }

    /// Second-to-last close; the last close when there is only one bar.
    pub fn previous_close(&self) -> f64 {
        match self.bars.len() {
            0 => 0.0,
            1 => self.bars[0].close,
            n => self.bars[n - 2].close,
        }
    }

    pub fn change(&self) -> f64 {
        self.last_close() - self.previous_close()
    }

    pub fn change_pct(&self) -> f64 {
        let prev = self.previous_close();
        if prev != 0.0 {
            self.change() / prev * 100.0
        } else {
            0.0
        }
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last().map(|b| b.time)
    }

    pub fn statistics(&self) -> Option<Statistics> {
        let first = self.bars.first()?;
        let last = self.bars.last()?;
        let n = self.bars.len() as f64;

        let closes = self.closes();
        let min_close = closes.iter().copied().fold(f64::INFINITY, f64::min);
        let max_close = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean_close = closes.iter().sum::<f64>() / n;
        let average_volume = self.bars.iter().map(|b| b.volume).sum::<f64>() / n;
        let period_return_pct = if first.close != 0.0 {
            (last.close - first.close) / first.close * 100.0
        } else {
            0.0
        };

        Some(Statistics {
            bars: self.bars.len(),
            first_close: first.close,
            last_close: last.close,
            period_return_pct,
            min_close,
            max_close,
            mean_close,
            average_volume,
        })
    }

    /// Rolling mean of closes, only when the series is at least `window`
    /// bars long. Warm-up slots are `None`.
    pub fn moving_average(&self, window: usize) -> Option<Vec<Option<f64>>> {
        if window == 0 || self.bars.len() < window {
            return None;
        }
        Some(rolling_mean(&self.closes(), window))
    }
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        out.push(if i + 1 >= window { Some(sum / window as f64) } else { None });
    }
    out
}

/// `1.25B`, `3.40M`, `12.00K`, `950`.
pub fn format_volume(volume: f64) -> String {
    if volume > 1e9 {
        format!("{:.2}B", volume / 1e9)
    } else if volume > 1e6 {
        format!("{:.2}M", volume / 1e6)
    } else if volume > 1e3 {
        format!("{:.2}K", volume / 1e3)
    } else {
        format!("{volume:.0}")
    }
}

/// Timestamp rendered in Paris local time.
pub fn paris_time(t: DateTime<Utc>) -> String {
    t.with_timezone(&PARIS_TZ).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn series(closes: &[f64]) -> History {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar {
                time: t0 + Duration::days(i as i64),
                open: *c,
                high: c + 1.0,
                low: c - 1.0,
                close: *c,
                volume: 1000.0 * (i + 1) as f64,
            })
            .collect();
        History::new("MC.PA", bars)
    }

    #[test]
    fn change_against_previous_close() {
        let h = series(&[100.0, 110.0]);
        assert_eq!(h.last_close(), 110.0);
        assert_eq!(h.previous_close(), 100.0);
        assert!((h.change_pct() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn single_bar_has_no_change() {
        let h = series(&[42.0]);
        assert_eq!(h.change(), 0.0);
        assert_eq!(h.change_pct(), 0.0);
    }

    #[test]
    fn empty_series_defaults_to_zero() {
        let h = History::new("X", vec![]);
        assert_eq!(h.last_close(), 0.0);
        assert!(h.statistics().is_none());
    }

    #[test]
    fn moving_average_requires_full_window() {
        let h = series(&[1.0, 2.0, 3.0, 4.0]);
        assert!(h.moving_average(20).is_none());
        let ma = h.moving_average(2).unwrap();
        assert_eq!(ma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn statistics_summary() {
        let s = series(&[100.0, 90.0, 120.0]).statistics().unwrap();
        assert_eq!(s.bars, 3);
        assert_eq!(s.min_close, 90.0);
        assert_eq!(s.max_close, 120.0);
        assert!((s.period_return_pct - 20.0).abs() < 1e-9);
        assert!((s.average_volume - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn volume_suffixes() {
        assert_eq!(format_volume(2_500_000_000.0), "2.50B");
        assert_eq!(format_volume(3_400_000.0), "3.40M");
        assert_eq!(format_volume(12_000.0), "12.00K");
        assert_eq!(format_volume(950.0), "950");
    }

    #[test]
    fn paris_time_applies_offset() {
        let t = Utc.with_ymd_and_hms(2024, 6, 12, 7, 0, 0).unwrap();
        assert_eq!(paris_time(t), "2024-06-12 09:00:00");
    }
}
