// ── Refresh windows ──
//
// Today, trailing 7 days, and trailing 30 days, all ending at today (UTC).
// Recomputed from the wall clock on every fetch; never persisted.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};

use flarestat_api::{DashboardVariables, RollingVariables};

/// Days before today that the week window starts.
const WEEK_SPAN_DAYS: u64 = 6;
/// Days before today that the month window starts.
const MONTH_SPAN_DAYS: u64 = 29;

/// Window boundaries derived from a single instant.
///
/// `month ⊇ week ⊇ today`: both trailing windows end at `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshWindow {
    pub today: NaiveDate,
    pub today_start: DateTime<Utc>,
    pub today_end: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
}

impl RefreshWindow {
    /// Windows for the current wall-clock time.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Windows for an arbitrary instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let today_start = midnight(today);
        Self {
            today,
            today_start,
            today_end: today_start + TimeDelta::days(1),
            week_start: midnight(back(today, WEEK_SPAN_DAYS)),
            month_start: midnight(back(today, MONTH_SPAN_DAYS)),
        }
    }

    pub fn week_start_date(&self) -> NaiveDate {
        back(self.today, WEEK_SPAN_DAYS)
    }

    pub fn month_start_date(&self) -> NaiveDate {
        back(self.today, MONTH_SPAN_DAYS)
    }

    pub fn is_today(&self, date: NaiveDate) -> bool {
        date == self.today
    }

    pub fn in_week(&self, date: NaiveDate) -> bool {
        self.week_start_date() <= date && date <= self.today
    }

    pub fn in_month(&self, date: NaiveDate) -> bool {
        self.month_start_date() <= date && date <= self.today
    }

    pub fn rolling_variables(&self, zone_tag: &str) -> RollingVariables {
        RollingVariables {
            zone_tag: zone_tag.to_owned(),
            month_start: self.month_start_date(),
            today_date: self.today,
            today_start: self.today_start,
            today_end: self.today_end,
            week_start: self.week_start,
            month_start_dt: self.month_start,
        }
    }

    pub fn dashboard_variables(&self, zone_tag: &str, top_limit: u32) -> DashboardVariables {
        DashboardVariables {
            zone_tag: zone_tag.to_owned(),
            today_date: self.today,
            today_start: self.today_start,
            today_end: self.today_end,
            top_limit,
        }
    }
}

fn back(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
