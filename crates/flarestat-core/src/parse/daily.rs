// Daily buckets → today / week / month totals.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use super::fields::{self, DAY_BYTES, DAY_DATE, DAY_REQUESTS, DAY_UNIQUES};
use crate::snapshot::WindowTotals;
use crate::window::RefreshWindow;

/// Rolling totals. Windows overlap: a bucket for today also counts
/// toward the week and the month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyTotals {
    pub today: WindowTotals,
    pub week: WindowTotals,
    pub month: WindowTotals,
}

/// Fold daily buckets into the three windows. Buckets whose date is
/// missing or unparsable are skipped; missing counts add zero.
pub fn summarize(groups: &[Value], window: &RefreshWindow) -> DailyTotals {
    let mut totals = DailyTotals::default();

    for bucket in groups {
        let Some(date) = bucket_date(bucket) else {
            debug!(?bucket, "skipping daily bucket without a usable date");
            continue;
        };

        let requests = fields::count_or_zero(bucket, DAY_REQUESTS);
        let bytes = fields::count_or_zero(bucket, DAY_BYTES);
        let uniques = fields::count_or_zero(bucket, DAY_UNIQUES);

        if window.is_today(date) {
            totals.today.add(requests, bytes, uniques);
        }
        if window.in_week(date) {
            totals.week.add(requests, bytes, uniques);
        }
        if window.in_month(date) {
            totals.month.add(requests, bytes, uniques);
        }
    }

    totals
}

fn bucket_date(bucket: &Value) -> Option<NaiveDate> {
    let raw = fields::first_present(bucket, DAY_DATE)?.as_str()?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
