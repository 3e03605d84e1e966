// ── Metric catalog ──
//
// Descriptors are data: a key, presentation metadata, and an enumerated
// extraction rule. Projecting a snapshot through a descriptor is pure and
// never fails; anything missing or mis-shaped yields `None` / empty.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use strum::{Display, IntoStaticStr};

use crate::config::QueryKind;
use crate::fetcher::AnalyticsFetcher;
use crate::snapshot::Snapshot;
use crate::units::BandwidthUnit;

use super::MetricView;

/// Semantic class of a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    DataSize,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
}

/// How a metric's value is projected out of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueRule {
    /// The top-level value under this key.
    Key(String),
    /// `snapshot[outer][inner]`.
    Field(String, String),
    /// A raw byte count under this key, converted to the catalog's unit.
    Bytes(String),
}

/// Extra structured fields exposed next to the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeRule {
    /// `{top_country, countries}` from a country summary under this key.
    CountryBreakdown(String),
}

/// Static definition of one derivable metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub key: String,
    pub name: String,
    pub unit: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub icon: Option<&'static str>,
    pub value: ValueRule,
    pub attributes: Option<AttributeRule>,
    /// Target unit for [`ValueRule::Bytes`].
    pub bandwidth_unit: BandwidthUnit,
}

impl MetricDescriptor {
    fn plain(key: &str, name: &str) -> Self {
        Self {
            key: key.to_owned(),
            name: name.to_owned(),
            unit: None,
            device_class: None,
            state_class: None,
            icon: None,
            value: ValueRule::Key(key.to_owned()),
            attributes: None,
            bandwidth_unit: BandwidthUnit::default(),
        }
    }

    fn bytes(key: &str, name: &str, raw_key: &str, unit: BandwidthUnit) -> Self {
        Self {
            unit: Some(unit.symbol()),
            device_class: Some(DeviceClass::DataSize),
            value: ValueRule::Bytes(raw_key.to_owned()),
            bandwidth_unit: unit,
            ..Self::plain(key, name)
        }
    }

    fn field(key: &str, name: &str, outer: &str, inner: &str) -> Self {
        Self {
            value: ValueRule::Field(outer.to_owned(), inner.to_owned()),
            ..Self::plain(key, name)
        }
    }

    fn country(key: &str, name: &str) -> Self {
        Self {
            state_class: Some(StateClass::Measurement),
            icon: Some("mdi:earth"),
            attributes: Some(AttributeRule::CountryBreakdown(key.to_owned())),
            ..Self::field(key, name, key, "top_requests")
        }
    }

    fn page_load(key: &str, name: &str, outer: &str) -> Self {
        Self {
            unit: Some("ms"),
            device_class: Some(DeviceClass::Duration),
            ..Self::field(key, name, outer, "page_load_time")
        }
    }

    /// Name as presented to users.
    pub fn display_name(&self) -> String {
        format!("Cloudflare {}", self.name)
    }

    /// Project the value out of `snapshot`. `None` when missing, null,
    /// or not convertible.
    pub fn value_of(&self, snapshot: &Snapshot) -> Option<Value> {
        let value = match &self.value {
            ValueRule::Key(key) => snapshot.get(key)?.clone(),
            ValueRule::Field(outer, inner) => snapshot.get_path(&[outer.as_str(), inner.as_str()])?.clone(),
            ValueRule::Bytes(key) => {
                let raw = snapshot.get(key)?.as_f64()?;
                Value::from(self.bandwidth_unit.convert(raw))
            }
        };
        (!value.is_null()).then_some(value)
    }

    /// Project the attributes out of `snapshot`; empty when there is no
    /// rule or the source is missing.
    pub fn attributes_of(&self, snapshot: &Snapshot) -> IndexMap<String, Value> {
        let mut attributes = IndexMap::new();
        match &self.attributes {
            None => {}
            Some(AttributeRule::CountryBreakdown(key)) => {
                let Some(summary) = snapshot.get(key).filter(|v| v.is_object()) else {
                    return attributes;
                };
                attributes.insert(
                    "top_country".to_owned(),
                    summary.get("top_country").cloned().unwrap_or(Value::Null),
                );
                attributes.insert(
                    "countries".to_owned(),
                    summary
                        .get("countries")
                        .cloned()
                        .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
                );
            }
        }
        attributes
    }
}

// ── Catalog ──────────────────────────────────────────────────────────

/// The fixed, ordered descriptor list for one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCatalog {
    descriptors: Vec<MetricDescriptor>,
}

impl MetricCatalog {
    pub fn new(query: QueryKind, unit: BandwidthUnit) -> Self {
        match query {
            QueryKind::Rolling => Self::rolling(unit),
            QueryKind::Dashboard => Self::dashboard(unit),
        }
    }

    /// Like [`new`](Self::new), with the unit given as a raw setting.
    pub fn from_setting(query: QueryKind, unit: &str) -> Self {
        Self::new(query, BandwidthUnit::from_setting(unit))
    }

    /// Rolling totals, country leaders, and web-performance figures.
    pub fn rolling(unit: BandwidthUnit) -> Self {
        use MetricDescriptor as D;

        let descriptors = vec![
            D::plain("views_today", "Requests Today"),
            D::plain("views_week", "Requests Week"),
            D::plain("views_month", "Requests Month"),
            D::plain("uniques_today", "Unique Visitors Today"),
            D::plain("uniques_week", "Unique Visitors Week"),
            D::plain("uniques_month", "Unique Visitors Month"),
            D::bytes("bandwidth_today", "Bandwidth Today", "bandwidth_today_bytes", unit),
            D::bytes("bandwidth_week", "Bandwidth Week", "bandwidth_week_bytes", unit),
            D::bytes("bandwidth_month", "Bandwidth Month", "bandwidth_month_bytes", unit),
            D::country("country_today", "Requests by Country Today"),
            D::country("country_week", "Requests by Country Week"),
            D::country("country_month", "Requests by Country Month"),
            D::page_load("page_load_today", "Page Load Time Today", "web_today"),
            D::page_load("page_load_week", "Page Load Time Week", "web_week"),
            D::page_load("page_load_month", "Page Load Time Month", "web_month"),
            D::field("visits_today", "Visits Today", "web_today", "visits"),
            D::field("visits_week", "Visits Week", "web_week", "visits"),
            D::field("visits_month", "Visits Month", "web_month", "visits"),
            D::field("page_views_today", "Page Views Today", "web_today", "page_views"),
            D::field("page_views_week", "Page Views Week", "web_week", "page_views"),
            D::field("page_views_month", "Page Views Month", "web_month", "page_views"),
        ];
        Self { descriptors }
    }

    /// Today's totals with cache/SSL splits and top-N lists. Status codes
    /// are data-dependent; see [`dynamic`](Self::dynamic).
    ///
    /// There are no bot or blocked-threat counters: the daily groups carry
    /// neither.
    pub fn dashboard(unit: BandwidthUnit) -> Self {
        use MetricDescriptor as D;

        let descriptors = vec![
            D::plain("requests_all", "Requests (All)"),
            D::plain("requests_cached", "Requests (Cached)"),
            D::plain("requests_uncached", "Requests (Uncached)"),
            D::plain("requests_ssl_encrypted", "Requests (SSL Encrypted)"),
            D::plain("requests_ssl_unencrypted", "Requests (SSL Unencrypted)"),
            D::plain("uniques_all", "Unique Visitors"),
            D::plain("threats_all", "Threats (All)"),
            D::bytes("bandwidth_all", "Bandwidth (All)", "bandwidth_all_bytes", unit),
            D::bytes("bandwidth_cached", "Bandwidth (Cached)", "bandwidth_cached_bytes", unit),
            D::bytes(
                "bandwidth_uncached",
                "Bandwidth (Uncached)",
                "bandwidth_uncached_bytes",
                unit,
            ),
            D::plain("top_countries", "Top Countries"),
            D::plain("top_paths", "Top Paths"),
            D::plain("top_user_agents", "Top User Agents"),
        ];
        Self { descriptors }
    }

    /// Descriptors for the `status_<code>` keys present in `snapshot`.
    pub fn dynamic(snapshot: &Snapshot) -> Vec<MetricDescriptor> {
        snapshot
            .keys()
            .filter_map(|key| {
                let code = key.strip_prefix("status_")?;
                Some(MetricDescriptor::plain(key, &format!("HTTP {code} Responses")))
            })
            .collect()
    }

    pub fn descriptors(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, key: &str) -> Option<&MetricDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// One view per descriptor, all sharing `fetcher`.
    pub fn views(&self, fetcher: &Arc<AnalyticsFetcher>) -> Vec<MetricView> {
        self.descriptors
            .iter()
            .map(|d| MetricView::new(Arc::clone(fetcher), d.clone()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::snapshot::CountrySummary;

    #[test]
    fn rolling_catalog_is_fixed_and_unique() {
        let catalog = MetricCatalog::rolling(BandwidthUnit::Megabytes);
        assert_eq!(catalog.len(), 21);
        let keys: HashSet<&str> = catalog.descriptors().iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys.len(), 21);
        assert_eq!(catalog, MetricCatalog::from_setting(QueryKind::Rolling, "mb"));
    }

    #[test]
    fn dashboard_catalog_lists_only_derivable_totals() {
        let catalog = MetricCatalog::dashboard(BandwidthUnit::Megabytes);
        let keys: Vec<&str> = catalog.descriptors().iter().map(|d| d.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "requests_all",
                "requests_cached",
                "requests_uncached",
                "requests_ssl_encrypted",
                "requests_ssl_unencrypted",
                "uniques_all",
                "threats_all",
                "bandwidth_all",
                "bandwidth_cached",
                "bandwidth_uncached",
                "top_countries",
                "top_paths",
                "top_user_agents",
            ]
        );
        assert!(catalog.get("requests_bot").is_none());
        assert!(catalog.get("threats_blocked").is_none());
    }

    #[test]
    fn invalid_unit_setting_falls_back_to_megabytes() {
        let catalog = MetricCatalog::from_setting(QueryKind::Rolling, "petabytes");
        let bw = catalog.get("bandwidth_today").unwrap();
        assert_eq!(bw.unit, Some("MB"));
        assert_eq!(bw.device_class, Some(DeviceClass::DataSize));
    }

    #[test]
    fn bytes_are_converted_at_read_time_without_touching_the_snapshot() {
        let mut snap = Snapshot::new();
        snap.insert("bandwidth_today_bytes", 3_145_728u64);

        let mb = MetricCatalog::rolling(BandwidthUnit::Megabytes);
        let kb = MetricCatalog::rolling(BandwidthUnit::Kilobytes);
        let read = |c: &MetricCatalog| c.get("bandwidth_today").and_then(|d| d.value_of(&snap));

        assert_eq!(read(&mb), Some(json!(3.0)));
        assert_eq!(read(&kb), Some(json!(3072.0)));
        assert_eq!(read(&mb), Some(json!(3.0)));
        assert_eq!(snap.get("bandwidth_today_bytes"), Some(&json!(3_145_728u64)));
    }

    #[test]
    fn country_metric_exposes_leader_and_breakdown() {
        let mut snap = Snapshot::new();
        let mut countries = IndexMap::new();
        countries.insert("US".to_owned(), 8);
        countries.insert("DE".to_owned(), 3);
        snap.insert(
            "country_week",
            CountrySummary {
                top_country: Some("US".to_owned()),
                top_requests: Some(8),
                countries,
            },
        );

        let catalog = MetricCatalog::rolling(BandwidthUnit::default());
        let d = catalog.get("country_week").unwrap();
        assert_eq!(d.icon, Some("mdi:earth"));
        assert_eq!(d.state_class, Some(StateClass::Measurement));
        assert_eq!(d.value_of(&snap), Some(json!(8)));

        let attrs = d.attributes_of(&snap);
        assert_eq!(attrs.get("top_country"), Some(&json!("US")));
        assert_eq!(attrs.get("countries"), Some(&json!({"US": 8, "DE": 3})));
    }

    #[test]
    fn missing_or_malformed_sources_yield_nothing() {
        let mut snap = Snapshot::new();
        snap.insert("web_today", "not an object");
        snap.insert("country_today", CountrySummary::default());
        snap.insert("bandwidth_week_bytes", "lots");

        let catalog = MetricCatalog::rolling(BandwidthUnit::default());
        for d in catalog.descriptors() {
            let _ = d.attributes_of(&snap);
        }
        let value = |key: &str| catalog.get(key).and_then(|d| d.value_of(&snap));
        assert_eq!(value("visits_today"), None);
        assert_eq!(value("country_today"), None);
        assert_eq!(value("bandwidth_week"), None);
        assert_eq!(value("views_month"), None);
        assert!(
            catalog
                .get("country_month")
                .is_some_and(|d| d.attributes_of(&snap).is_empty())
        );
    }

    #[test]
    fn status_descriptors_follow_the_snapshot() {
        let mut snap = Snapshot::new();
        snap.insert("requests_all", 12u64);
        snap.insert("status_200", 10u64);
        snap.insert("status_404", 2u64);
        let dynamic = MetricCatalog::dynamic(&snap);
        let keys: Vec<&str> = dynamic.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, ["status_200", "status_404"]);
        assert_eq!(dynamic[1].display_name(), "Cloudflare HTTP 404 Responses");
        assert_eq!(dynamic[0].value_of(&snap), Some(json!(10)));
    }
}
