//! `flarestat metrics`: one refresh, every metric.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tabled::Tabled;

use flarestat_core::{AnalyticsFetcher, MetricCatalog, MetricView, QueryKind};

use crate::cli::{GlobalOpts, MetricsArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

/// One metric as printed.
#[derive(Debug, Serialize)]
pub struct MetricReport {
    pub key: String,
    pub name: String,
    pub unique_id: String,
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub async fn handle(args: MetricsArgs, mut resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(query) = args.query {
        resolved.zone.query = query.into();
    }
    let fetcher = Arc::new(AnalyticsFetcher::new(&resolved.zone)?);
    super::refresh_once(&fetcher).await?;

    let reports = collect(&fetcher, &resolved, &args);
    let out = render(&reports, global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Build one view per metric, derive from the current snapshot, and
/// apply the key filters.
pub fn collect(fetcher: &Arc<AnalyticsFetcher>, resolved: &Resolved, args: &MetricsArgs) -> Vec<MetricReport> {
    let catalog = MetricCatalog::new(fetcher.query(), resolved.zone.bandwidth_unit);
    let mut views = catalog.views(fetcher);
    if fetcher.query() == QueryKind::Dashboard {
        let snapshot = fetcher.snapshot();
        views.extend(
            MetricCatalog::dynamic(&snapshot)
                .into_iter()
                .map(|d| MetricView::new(Arc::clone(fetcher), d)),
        );
    }

    views
        .iter_mut()
        .filter(|view| args.keys.is_empty() || args.keys.iter().any(|k| k == view.key()))
        .filter_map(|view| {
            view.update();
            if args.hide_empty && view.value().is_none() {
                return None;
            }
            Some(report(view, &resolved.zone.zone_id))
        })
        .collect()
}

fn report(view: &MetricView, zone_id: &str) -> MetricReport {
    let descriptor = view.descriptor();
    MetricReport {
        key: descriptor.key.clone(),
        name: descriptor.display_name(),
        unique_id: view.unique_id(zone_id),
        value: view.value().cloned(),
        unit: descriptor.unit,
        attributes: view
            .attributes()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

pub fn render(reports: &[MetricReport], global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    output::render_list(
        &global.output,
        reports,
        |r| MetricRow {
            name: r.name.clone(),
            value: r
                .value
                .as_ref()
                .map_or_else(|| output::unavailable(color), output::format_value),
            unit: r.unit.unwrap_or_default().to_owned(),
            detail: detail(r),
        },
        |r| {
            let value = r.value.as_ref().map_or_else(String::new, output::format_value);
            format!("{}={value}", r.key)
        },
    )
}

/// Short summary of the attributes for the table's last column.
fn detail(report: &MetricReport) -> String {
    let Some(top) = report.attributes.get("top_country").and_then(Value::as_str) else {
        return String::new();
    };
    let count = report
        .attributes
        .get("countries")
        .and_then(Value::as_object)
        .map_or(0, Map::len);
    format!("top: {top} of {count}")
}
