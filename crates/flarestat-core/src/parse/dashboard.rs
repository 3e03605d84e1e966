// Today's dashboard totals, status-code expansion, and top-N lists.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use super::fields::{
    self, DAY_BYTES, DAY_CACHED_BYTES, DAY_CACHED_REQUESTS, DAY_ENCRYPTED_REQUESTS, DAY_REQUESTS,
    DAY_STATUS_MAP, DAY_THREATS, DAY_UNIQUES, FieldPath, STATUS_CODE, STATUS_COUNT, TOP_COUNT,
};
use super::section;
use crate::snapshot::{Snapshot, TopEntry};

/// Write the fixed totals for the day's bucket(s) into `snapshot`.
///
/// Nothing is written when the daily section is empty.
pub fn write_totals(groups: &[Value], snapshot: &mut Snapshot) {
    if groups.is_empty() {
        return;
    }

    let sum = |candidates: &[FieldPath]| {
        groups.iter().fold(0u64, |acc, group| {
            acc.saturating_add(fields::count_or_zero(group, candidates))
        })
    };

    let requests = sum(DAY_REQUESTS);
    let cached = sum(DAY_CACHED_REQUESTS);
    let encrypted = sum(DAY_ENCRYPTED_REQUESTS);
    let bytes = sum(DAY_BYTES);
    let cached_bytes = sum(DAY_CACHED_BYTES);

    snapshot.insert("requests_all", requests);
    snapshot.insert("requests_cached", cached);
    snapshot.insert("requests_uncached", requests.saturating_sub(cached));
    snapshot.insert("requests_ssl_encrypted", encrypted);
    snapshot.insert("requests_ssl_unencrypted", requests.saturating_sub(encrypted));
    snapshot.insert("uniques_all", sum(DAY_UNIQUES));
    snapshot.insert("threats_all", sum(DAY_THREATS));
    snapshot.insert("bandwidth_all_bytes", bytes);
    snapshot.insert("bandwidth_cached_bytes", cached_bytes);
    snapshot.insert("bandwidth_uncached_bytes", bytes.saturating_sub(cached_bytes));
}

/// Status-code rows nested in each daily bucket.
pub fn status_rows(groups: &[Value]) -> Vec<&Value> {
    groups
        .iter()
        .flat_map(|group| {
            fields::first_present(group, DAY_STATUS_MAP)
                .map(|value| section::as_groups(value, "responseStatusMap"))
                .unwrap_or_default()
        })
        .collect()
}

/// Expand `(code, count)` rows into one `status_<code>` key per observed
/// code. Repeated codes are summed; rows without a code are dropped.
pub fn status_codes<'a>(rows: impl IntoIterator<Item = &'a Value>) -> IndexMap<String, u64> {
    let mut codes: IndexMap<String, u64> = IndexMap::new();
    for row in rows {
        let Some(code) = fields::first_label(row, STATUS_CODE) else {
            warn!(?row, "status row without a code");
            continue;
        };
        let count = fields::count_or_zero(row, STATUS_COUNT);
        let entry = codes.entry(format!("status_{code}")).or_insert(0);
        *entry = entry.saturating_add(count);
    }
    codes
}

/// Keep the upstream order; rows without a label are dropped.
pub fn top_entries(groups: &[Value], label: &[FieldPath]) -> Vec<TopEntry> {
    groups
        .iter()
        .filter_map(|group| {
            Some(TopEntry {
                label: fields::first_label(group, label)?,
                count: fields::count_or_zero(group, TOP_COUNT),
            })
        })
        .collect()
}

/// Top-N lists are carried as a single JSON string per metric.
pub fn encode_top(entries: &[TopEntry]) -> String {
    serde_json::to_string(entries).unwrap_or_else(|_| String::from("[]"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::parse::fields::TOP_PATH_LABEL;

    #[test]
    fn status_codes_expand_to_one_key_each() {
        let rows = [json!({"code": 200, "count": 10}), json!({"code": 404, "count": 2})];
        let codes = status_codes(rows.iter());
        assert_eq!(
            codes.into_iter().collect::<Vec<_>>(),
            vec![("status_200".to_owned(), 10), ("status_404".to_owned(), 2)]
        );
    }

    #[test]
    fn repeated_status_codes_are_summed() {
        let rows = [
            json!({"edgeResponseStatus": 200, "requests": 3}),
            json!({"edgeResponseStatus": 200, "requests": 4}),
            json!({"requests": 9}),
        ];
        let codes = status_codes(rows.iter());
        assert_eq!(codes.len(), 1);
        assert_eq!(codes.get("status_200"), Some(&7));
    }

    #[test]
    fn uncached_splits_never_underflow() {
        let groups = [json!({
            "sum": {"requests": 5, "cachedRequests": 9, "encryptedRequests": 2,
                    "bytes": 100, "cachedBytes": 40, "threats": 1},
            "uniq": {"uniques": 3},
        })];
        let mut snap = Snapshot::new();
        write_totals(&groups, &mut snap);
        assert_eq!(snap.get("requests_uncached"), Some(&json!(0)));
        assert_eq!(snap.get("requests_ssl_unencrypted"), Some(&json!(3)));
        assert_eq!(snap.get("bandwidth_uncached_bytes"), Some(&json!(60)));
        assert_eq!(snap.get("threats_all"), Some(&json!(1)));
    }

    #[test]
    fn top_entries_keep_upstream_order() {
        let groups = [
            json!({"count": 50, "dimensions": {"clientRequestPath": "/"}}),
            json!({"count": 20, "dimensions": {"clientRequestPath": "/blog"}}),
            json!({"count": 10, "dimensions": {}}),
        ];
        let encoded = encode_top(&top_entries(&groups, TOP_PATH_LABEL));
        assert_eq!(
            encoded,
            r#"[{"label":"/","count":50},{"label":"/blog","count":20}]"#
        );
    }
}
