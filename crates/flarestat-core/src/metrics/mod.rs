//! Metric descriptors and per-metric views over the shared snapshot.

mod catalog;
mod view;

pub use catalog::{AttributeRule, DeviceClass, MetricCatalog, MetricDescriptor, StateClass, ValueRule};
pub use view::MetricView;
