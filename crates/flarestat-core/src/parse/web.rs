// Web-performance groups → visits, page views, mean load time.

use serde_json::Value;

use super::fields::{self, WEB_PAGE_LOAD, WEB_PAGE_VIEWS, WEB_VISITS};
use crate::snapshot::WebSummary;

/// Visits and page views are summed. Load time is the unweighted mean
/// of the per-group averages that are present.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn summarize(groups: &[Value]) -> WebSummary {
    let mut summary = WebSummary::default();
    let mut load_total = 0.0;
    let mut load_samples = 0usize;

    for group in groups {
        summary.visits = summary
            .visits
            .saturating_add(fields::count_or_zero(group, WEB_VISITS));
        summary.page_views = summary
            .page_views
            .saturating_add(fields::count_or_zero(group, WEB_PAGE_VIEWS));
        if let Some(load) = fields::first_f64(group, WEB_PAGE_LOAD) {
            load_total += load;
            load_samples += 1;
        }
    }

    if load_samples > 0 {
        summary.page_load_time = Some(load_total / load_samples as f64);
    }
    summary
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use serde_json::json;

    use super::*;

    fn group(visits: u64, views: u64, load: Option<f64>) -> Value {
        json!({"sum": {"visits": visits, "pageViews": views}, "avg": {"pageLoadTime": load}})
    }

    #[test]
    fn load_time_is_average_of_averages() {
        let summary = summarize(&[
            group(1, 10, Some(100.0)),
            group(100, 1000, None),
            group(1, 10, Some(300.0)),
        ]);
        assert_eq!(summary.page_load_time, Some(200.0));
        assert_eq!(summary.visits, 102);
        assert_eq!(summary.page_views, 1020);
    }

    #[test]
    fn load_time_is_null_without_samples() {
        let summary = summarize(&[group(3, 4, None)]);
        assert_eq!(summary.page_load_time, None);
        assert_eq!(summarize(&[]), WebSummary::default());
    }
}
