// Country groups → per-country map plus leader.

use indexmap::IndexMap;
use serde_json::Value;

use super::fields::{self, COUNTRY_NAME, COUNTRY_REQUESTS, UNKNOWN_COUNTRY};
use crate::snapshot::CountrySummary;

/// Sum requests per country and pick the leader. On equal counts the
/// country seen first keeps the lead.
pub fn summarize(groups: &[Value]) -> CountrySummary {
    let mut countries: IndexMap<String, u64> = IndexMap::new();
    for group in groups {
        let name = fields::first_label(group, COUNTRY_NAME)
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_owned());
        let requests = fields::count_or_zero(group, COUNTRY_REQUESTS);
        let entry = countries.entry(name).or_insert(0);
        *entry = entry.saturating_add(requests);
    }

    let mut leader: Option<(&String, u64)> = None;
    for (name, &count) in &countries {
        if leader.is_none_or(|(_, best)| count > best) {
            leader = Some((name, count));
        }
    }

    let (top_country, top_requests) = match leader {
        Some((name, count)) => (Some(name.clone()), Some(count)),
        None => (None, None),
    };

    CountrySummary {
        top_country,
        top_requests,
        countries,
    }
}
