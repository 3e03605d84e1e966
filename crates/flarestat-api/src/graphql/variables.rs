// Query variables
//
// Dates go out as `YYYY-MM-DD`, instants as `YYYY-MM-DDTHH:MM:SSZ` (no
// fractional seconds: the analytics API rejects them on some datasets).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

fn rfc3339_seconds<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&dt.format("%Y-%m-%dT%H:%M:%SZ"))
}

fn iso_date<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&date.format("%Y-%m-%d"))
}

/// Variables for [`ROLLING_QUERY`](super::queries::ROLLING_QUERY).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingVariables {
    pub zone_tag: String,
    #[serde(serialize_with = "iso_date")]
    pub month_start: NaiveDate,
    #[serde(serialize_with = "iso_date")]
    pub today_date: NaiveDate,
    #[serde(serialize_with = "rfc3339_seconds")]
    pub today_start: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_seconds")]
    pub today_end: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_seconds")]
    pub week_start: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_seconds")]
    pub month_start_dt: DateTime<Utc>,
}

/// Variables for [`DASHBOARD_QUERY`](super::queries::DASHBOARD_QUERY).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardVariables {
    pub zone_tag: String,
    #[serde(serialize_with = "iso_date")]
    pub today_date: NaiveDate,
    #[serde(serialize_with = "rfc3339_seconds")]
    pub today_start: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_seconds")]
    pub today_end: DateTime<Utc>,
    pub top_limit: u32,
}
