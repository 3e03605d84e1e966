//! Response-to-snapshot parsing.
//!
//! Each section (one aliased sub-query under `data.viewer.zones[0]`) is
//! parsed independently. A section that is missing or has the wrong
//! shape contributes its "no data" form; it never aborts the others.

pub mod country;
pub mod daily;
pub mod dashboard;
pub mod fields;
pub mod web;

use serde_json::Value;

use crate::snapshot::Snapshot;
use crate::window::RefreshWindow;

// ── Section aliases ──────────────────────────────────────────────────

const DAILY: &str = "httpRequests1dGroups";
const WINDOWS: [&str; 3] = ["today", "week", "month"];
const COUNTRY_ALIASES: [&str; 3] = ["countryToday", "countryWeek", "countryMonth"];
const WEB_ALIASES: [&str; 3] = ["webToday", "webWeek", "webMonth"];
const TOP_COUNTRIES: &str = "topCountries";
const TOP_PATHS: &str = "topPaths";
const TOP_USER_AGENTS: &str = "topUserAgents";

/// Parse the rolling query's zone object.
pub fn rolling(zone: &Value, window: &RefreshWindow) -> Snapshot {
    let mut snapshot = Snapshot::new();

    let daily = section::groups(zone, DAILY);
    if daily.is_empty() {
        tracing::debug!("no daily buckets returned");
    } else {
        let totals = daily::summarize(daily, window);
        let per_window = [totals.today, totals.week, totals.month];
        for (name, t) in WINDOWS.iter().zip(per_window) {
            snapshot.insert(format!("views_{name}"), t.requests);
        }
        for (name, t) in WINDOWS.iter().zip(per_window) {
            snapshot.insert(format!("uniques_{name}"), t.uniques);
        }
        for (name, t) in WINDOWS.iter().zip(per_window) {
            snapshot.insert(format!("bandwidth_{name}_bytes"), t.bytes);
        }
    }

    for (name, alias) in WINDOWS.iter().zip(COUNTRY_ALIASES) {
        let summary = country::summarize(section::groups(zone, alias));
        snapshot.insert(format!("country_{name}"), summary);
    }

    for (name, alias) in WINDOWS.iter().zip(WEB_ALIASES) {
        let summary = web::summarize(section::groups(zone, alias));
        snapshot.insert(format!("web_{name}"), summary);
    }

    snapshot
}

/// Parse the dashboard query's zone object.
pub fn dashboard(zone: &Value) -> Snapshot {
    let mut snapshot = Snapshot::new();

    let daily = section::groups(zone, DAILY);
    dashboard::write_totals(daily, &mut snapshot);
    for (key, count) in dashboard::status_codes(dashboard::status_rows(daily)) {
        snapshot.insert(key, count);
    }

    let tops = [
        ("top_countries", TOP_COUNTRIES, fields::TOP_COUNTRY_LABEL),
        ("top_paths", TOP_PATHS, fields::TOP_PATH_LABEL),
        ("top_user_agents", TOP_USER_AGENTS, fields::TOP_USER_AGENT_LABEL),
    ];
    for (key, alias, label) in tops {
        let entries = dashboard::top_entries(section::groups(zone, alias), label);
        snapshot.insert(key, dashboard::encode_top(&entries));
    }

    snapshot
}

pub(crate) mod section {
    use serde_json::Value;
    use tracing::warn;

    /// The group list under `alias`. Absent or `null` is an empty list;
    /// any other non-array is logged and treated as empty.
    pub fn groups<'a>(zone: &'a Value, alias: &str) -> &'a [Value] {
        zone.get(alias)
            .map(|value| as_groups(value, alias))
            .unwrap_or_default()
    }

    pub fn as_groups<'a>(value: &'a Value, alias: &str) -> &'a [Value] {
        match value {
            Value::Array(items) => items,
            Value::Null => &[],
            other => {
                warn!(section = alias, kind = kind(other), "unexpected section shape");
                &[]
            }
        }
    }

    fn kind(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn window() -> RefreshWindow {
        RefreshWindow::at(Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap())
    }

    #[test]
    fn rolling_snapshot_has_every_section() {
        let zone = json!({
            "httpRequests1dGroups": [
                {"dimensions": {"date": "2024-05-09"}, "sum": {"requests": 10, "bytes": 2048}, "uniq": {"uniques": 3}},
                {"dimensions": {"date": "2024-05-10"}, "sum": {"requests": 5, "bytes": 1024}, "uniq": {"uniques": 2}},
            ],
            "countryToday": [{"dimensions": {"clientCountryName": "US"}, "sum": {"requests": 5}}],
            "countryWeek": [],
            "webToday": [{"sum": {"visits": 2, "pageViews": 6}, "avg": {"pageLoadTime": 250.0}}],
        });
        let snap = rolling(&zone, &window());

        assert_eq!(snap.get("views_today"), Some(&json!(5)));
        assert_eq!(snap.get("views_week"), Some(&json!(15)));
        assert_eq!(snap.get("bandwidth_month_bytes"), Some(&json!(3072)));
        assert_eq!(snap.get("uniques_week"), Some(&json!(5)));
        assert_eq!(snap.get_path(&["country_today", "top_country"]), Some(&json!("US")));
        assert_eq!(snap.get_path(&["country_week", "top_requests"]), Some(&Value::Null));
        assert_eq!(snap.get_path(&["country_month", "countries"]), Some(&json!({})));
        assert_eq!(snap.get_path(&["web_today", "page_load_time"]), Some(&json!(250.0)));
        assert_eq!(snap.get_path(&["web_month", "visits"]), Some(&json!(0)));
    }

    #[test]
    fn empty_daily_section_writes_no_daily_keys() {
        let snap = rolling(&json!({"httpRequests1dGroups": []}), &window());
        assert!(snap.get("views_today").is_none());
        assert!(snap.get("bandwidth_week_bytes").is_none());
        assert!(snap.get("country_today").is_some());
    }

    #[test]
    fn malformed_section_degrades_alone() {
        let zone = json!({
            "httpRequests1dGroups": {"unexpected": true},
            "countryToday": "oops",
            "webWeek": [{"sum": {"visits": 7}}],
        });
        let snap = rolling(&zone, &window());
        assert!(snap.get("views_today").is_none());
        assert_eq!(snap.get_path(&["country_today", "top_country"]), Some(&Value::Null));
        assert_eq!(snap.get_path(&["web_week", "visits"]), Some(&json!(7)));
    }

    #[test]
    fn dashboard_snapshot_expands_status_codes() {
        let zone = json!({
            "httpRequests1dGroups": [{
                "dimensions": {"date": "2024-05-10"},
                "sum": {
                    "requests": 12, "cachedRequests": 4, "encryptedRequests": 10,
                    "bytes": 4096, "cachedBytes": 1024, "threats": 0,
                    "responseStatusMap": [
                        {"edgeResponseStatus": 200, "requests": 10},
                        {"edgeResponseStatus": 404, "requests": 2},
                    ],
                },
                "uniq": {"uniques": 6},
            }],
            "topCountries": [{"count": 9, "dimensions": {"clientCountryName": "CA"}}],
        });
        let snap = dashboard(&zone);

        let status_keys: Vec<&str> = snap.keys().filter(|k| k.starts_with("status_")).collect();
        assert_eq!(status_keys, ["status_200", "status_404"]);
        assert_eq!(snap.get("status_200"), Some(&json!(10)));
        assert_eq!(snap.get("requests_uncached"), Some(&json!(8)));
        assert_eq!(snap.get("bandwidth_uncached_bytes"), Some(&json!(3072)));
        assert_eq!(snap.get("top_countries"), Some(&json!(r#"[{"label":"CA","count":9}]"#)));
        assert_eq!(snap.get("top_paths"), Some(&json!("[]")));
    }
}
