//! Euronext Paris session status.
//!
//! Pure over (instant, calendar): no wall clock is read here, callers pass
//! `Utc::now()` or a fixed instant.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Weekday};
use chrono_tz::{America::New_York, Europe::Paris, Tz};
use serde::Serialize;

pub const PARIS_TZ: Tz = Paris;
pub const NEW_YORK_TZ: Tz = New_York;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketStatus {
    Open,
    PreOpen,
    PostClose,
    ClosedWeekend,
    ClosedHoliday,
    ClosedOther,
}

impl MarketStatus {
    pub fn label(self) -> &'static str {
        match self {
            MarketStatus::Open => "Open",
            MarketStatus::PreOpen => "Pre-open",
            MarketStatus::PostClose => "After close",
            MarketStatus::ClosedWeekend => "Closed (weekend)",
            MarketStatus::ClosedHoliday => "Closed (public holiday)",
            MarketStatus::ClosedOther => "Closed",
        }
    }

    /// Traffic-light colour for the status badge.
    pub fn indicator(self) -> &'static str {
        match self {
            MarketStatus::Open => "green",
            MarketStatus::PreOpen | MarketStatus::PostClose => "amber",
            _ => "red",
        }
    }

    pub fn is_open(self) -> bool {
        self == MarketStatus::Open
    }
}

// French public holidays the dashboard treats as non-trading days.
const BUILTIN_HOLIDAYS: &[&str] = &[
    "2024-01-01", "2024-04-01", "2024-05-01", "2024-05-08", "2024-05-09", "2024-05-20",
    "2024-07-14", "2024-08-15", "2024-11-01", "2024-11-11", "2024-12-25",
    "2025-01-01", "2025-04-21", "2025-05-01", "2025-05-08", "2025-05-29", "2025-06-09",
    "2025-07-14", "2025-08-15", "2025-11-01", "2025-11-11", "2025-12-25",
    "2026-01-01", "2026-04-06", "2026-05-01", "2026-05-08", "2026-05-14", "2026-05-25",
    "2026-07-14", "2026-08-15", "2026-11-01", "2026-11-11", "2026-12-25",
];

/// Holiday dates for the Paris market. Static: later years are added through
/// configuration, nothing rolls over automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl MarketCalendar {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn euronext_paris() -> Self {
        Self::new(BUILTIN_HOLIDAYS.iter().filter_map(|d| parse_iso_date(d)))
    }

    /// Adds ISO dates (`YYYY-MM-DD`); malformed entries are skipped.
    pub fn with_extra<'a>(mut self, dates: impl IntoIterator<Item = &'a str>) -> Self {
        for raw in dates {
            match parse_iso_date(raw) {
                Some(d) => {
                    self.holidays.insert(d);
                }
                None => tracing::warn!("ignoring malformed holiday date '{}'", raw),
            }
        }
        self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}

fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap_or(NaiveTime::MIN)
}

/// Status of the Paris market at `now`, whatever timezone `now` carries.
///
/// 17:00:00 through 17:30:00 inclusive is still `Open`; 17:30:01 is the first
/// `PostClose` second.
pub fn session_status<T: TimeZone>(now: &DateTime<T>, calendar: &MarketCalendar) -> MarketStatus {
    let local = now.with_timezone(&PARIS_TZ);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return MarketStatus::ClosedWeekend;
    }

    if calendar.is_holiday(local.date_naive()) {
        return MarketStatus::ClosedHoliday;
    }

    let t = local.time();
    if t >= hms(9, 0, 0) && t < hms(17, 0, 0) {
        MarketStatus::Open
    } else if t >= hms(17, 0, 0) && t <= hms(17, 30, 0) {
        MarketStatus::Open
    } else if t >= hms(7, 15, 0) && t < hms(9, 0, 0) {
        MarketStatus::PreOpen
    } else if t > hms(17, 30, 0) && t < hms(20, 0, 0) {
        MarketStatus::PostClose
    } else {
        MarketStatus::ClosedOther
    }
}
