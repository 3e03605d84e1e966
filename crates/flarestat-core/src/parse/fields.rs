// ── Candidate field paths ──
//
// Every upstream value is looked up through an ordered list of candidate
// paths; the first one that is present and non-null wins. When the API
// renames or moves a field, add the new path here (newest first) rather
// than branching in the section parsers.

use serde_json::Value;

/// A path of object keys, relative to one group in a section.
pub type FieldPath = &'static [&'static str];

// ── Daily totals (`httpRequests1dGroups`) ────────────────────────────

/// Bucket date, `YYYY-MM-DD`.
pub const DAY_DATE: &[FieldPath] = &[&["dimensions", "date"], &["date"]];
/// Requests in the bucket. Older schemas exposed a bare `count`.
pub const DAY_REQUESTS: &[FieldPath] = &[&["sum", "requests"], &["count"]];
/// Bytes served in the bucket.
pub const DAY_BYTES: &[FieldPath] = &[&["sum", "bytes"], &["sum", "edgeResponseBytes"]];
/// Unique visitors in the bucket.
pub const DAY_UNIQUES: &[FieldPath] = &[&["uniq", "uniques"], &["sum", "uniques"]];
pub const DAY_CACHED_REQUESTS: &[FieldPath] = &[&["sum", "cachedRequests"]];
pub const DAY_ENCRYPTED_REQUESTS: &[FieldPath] = &[&["sum", "encryptedRequests"]];
pub const DAY_CACHED_BYTES: &[FieldPath] = &[&["sum", "cachedBytes"]];
pub const DAY_THREATS: &[FieldPath] = &[&["sum", "threats"]];
/// Per-status breakdown nested inside a daily bucket.
pub const DAY_STATUS_MAP: &[FieldPath] = &[&["sum", "responseStatusMap"]];

// ── Status codes ─────────────────────────────────────────────────────

pub const STATUS_CODE: &[FieldPath] = &[&["edgeResponseStatus"], &["code"], &["status"]];
pub const STATUS_COUNT: &[FieldPath] = &[&["requests"], &["count"]];

// ── Country breakdowns (`httpRequestsAdaptiveGroups`) ────────────────

/// Country label. Missing or empty names fold into [`UNKNOWN_COUNTRY`].
pub const COUNTRY_NAME: &[FieldPath] = &[
    &["dimensions", "clientCountryName"],
    &["dimensions", "clientCountryAlpha2"],
    &["dimensions", "country"],
];
pub const COUNTRY_REQUESTS: &[FieldPath] = &[&["sum", "requests"], &["count"]];
pub const UNKNOWN_COUNTRY: &str = "Unknown";

// ── Web performance (`rumPageloadEventsAdaptiveGroups`) ──────────────

pub const WEB_VISITS: &[FieldPath] = &[&["sum", "visits"]];
pub const WEB_PAGE_VIEWS: &[FieldPath] = &[&["sum", "pageViews"], &["count"]];
/// Average page-load time in milliseconds for the group.
pub const WEB_PAGE_LOAD: &[FieldPath] = &[&["avg", "pageLoadTime"]];

// ── Top-N breakdowns ─────────────────────────────────────────────────

pub const TOP_COUNT: &[FieldPath] = &[&["count"], &["sum", "requests"]];
pub const TOP_COUNTRY_LABEL: &[FieldPath] = &[
    &["dimensions", "clientCountryName"],
    &["dimensions", "clientCountryAlpha2"],
];
pub const TOP_PATH_LABEL: &[FieldPath] = &[&["dimensions", "clientRequestPath"]];
pub const TOP_USER_AGENT_LABEL: &[FieldPath] = &[&["dimensions", "userAgent"]];

// ── Lookup ───────────────────────────────────────────────────────────

/// First candidate that resolves to a non-null value.
pub fn first_present<'a>(item: &'a Value, candidates: &[FieldPath]) -> Option<&'a Value> {
    candidates.iter().find_map(|path| {
        path.iter()
            .try_fold(item, |value, key| value.get(*key))
            .filter(|value| !value.is_null())
    })
}

/// Non-negative count. Accepts integers, whole or fractional floats
/// (truncated), and numeric strings; anything else is absent.
pub fn first_u64(item: &Value, candidates: &[FieldPath]) -> Option<u64> {
    first_present(item, candidates).and_then(as_count)
}

/// Count with the absent case folded to zero.
pub fn count_or_zero(item: &Value, candidates: &[FieldPath]) -> u64 {
    first_u64(item, candidates).unwrap_or(0)
}

pub fn first_f64(item: &Value, candidates: &[FieldPath]) -> Option<f64> {
    match first_present(item, candidates)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A label, rendered from a string or a number. Empty strings are absent.
pub fn first_label(item: &Value, candidates: &[FieldPath]) -> Option<String> {
    match first_present(item, candidates)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn first_candidate_wins_and_nulls_are_skipped() {
        let item = json!({"sum": {"requests": null}, "count": 7});
        assert_eq!(first_u64(&item, DAY_REQUESTS), Some(7));

        let item = json!({"sum": {"requests": 3}, "count": 7});
        assert_eq!(first_u64(&item, DAY_REQUESTS), Some(3));
    }

    #[test]
    fn counts_are_lenient_about_encoding() {
        assert_eq!(as_count(&json!(12)), Some(12));
        assert_eq!(as_count(&json!(12.9)), Some(12));
        assert_eq!(as_count(&json!("44")), Some(44));
        assert_eq!(as_count(&json!(-1)), None);
        assert_eq!(as_count(&json!("x")), None);
        assert_eq!(as_count(&json!({"n": 1})), None);
    }

    #[test]
    fn wrong_intermediate_type_is_absent() {
        let item = json!({"sum": [1, 2, 3]});
        assert_eq!(first_u64(&item, DAY_BYTES), None);
        assert_eq!(count_or_zero(&item, DAY_BYTES), 0);
    }

    #[test]
    fn labels_render_numbers_and_reject_empty_strings() {
        assert_eq!(
            first_label(&json!({"edgeResponseStatus": 404}), STATUS_CODE).as_deref(),
            Some("404")
        );
        assert_eq!(
            first_label(&json!({"dimensions": {"clientCountryName": ""}}), COUNTRY_NAME),
            None
        );
        assert_eq!(first_f64(&json!({"avg": {"pageLoadTime": "120.5"}}), WEB_PAGE_LOAD), Some(120.5));
    }
}
