// ── Metric view ──
//
// One per descriptor per zone. Holds a handle to the shared fetcher and
// its own last-derived value; never writes to the snapshot.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::MetricDescriptor;
use crate::fetcher::AnalyticsFetcher;

#[derive(Debug, Clone)]
pub struct MetricView {
    fetcher: Arc<AnalyticsFetcher>,
    descriptor: MetricDescriptor,
    value: Option<Value>,
    attributes: IndexMap<String, Value>,
}

impl MetricView {
    pub fn new(fetcher: Arc<AnalyticsFetcher>, descriptor: MetricDescriptor) -> Self {
        Self {
            fetcher,
            descriptor,
            value: None,
            attributes: IndexMap::new(),
        }
    }

    /// Trigger the shared (throttled) refresh, then re-derive.
    pub async fn read(&mut self) -> Option<&Value> {
        self.fetcher.refresh().await;
        self.update();
        self.value.as_ref()
    }

    /// Re-derive value and attributes from the current snapshot without
    /// refreshing.
    pub fn update(&mut self) {
        let snapshot = self.fetcher.snapshot();
        self.value = self.descriptor.value_of(&snapshot);
        self.attributes = self.descriptor.attributes_of(&snapshot);
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    pub fn key(&self) -> &str {
        &self.descriptor.key
    }

    /// Stable identifier, `cloudflare_<zone>_<key>`.
    pub fn unique_id(&self, zone: &str) -> String {
        format!("cloudflare_{zone}_{}", self.descriptor.key)
    }
}
