//! Analytics aggregation and refresh layer between `flarestat-api` and
//! metric consumers.
//!
//! - **[`AnalyticsFetcher`]**: owns the zone identity and token, issues one
//!   batched GraphQL query per refresh, parses the response into a flat
//!   [`Snapshot`], and gates refreshes behind a minimum interval so any
//!   number of concurrent readers share a single round trip.
//!
//! - **[`RefreshWindow`]**: today / trailing 7 days / trailing 30 days,
//!   recomputed from the wall clock on every fetch.
//!
//! - **[`MetricCatalog`]** / **[`MetricDescriptor`]**: the static list of
//!   derivable metrics with their value and attribute extraction rules.
//!
//! - **[`MetricView`]**: one per descriptor; triggers the shared refresh,
//!   then projects its own value out of the latest snapshot. Never fails.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod parse;
pub mod snapshot;
pub mod units;
pub mod window;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{QueryKind, ZoneConfig};
pub use error::CoreError;
pub use fetcher::{AnalyticsFetcher, RefreshOutcome, spawn_refresh_task};
pub use metrics::{
    AttributeRule, DeviceClass, MetricCatalog, MetricDescriptor, MetricView, StateClass,
    ValueRule,
};
pub use snapshot::{CountrySummary, Snapshot, TopEntry, WebSummary, WindowTotals};
pub use units::BandwidthUnit;
pub use window::RefreshWindow;
