// ── Runtime zone configuration ──
//
// These types describe *which* zone to poll and *how often*. They carry
// the bearer token and refresh tuning, but never touch disk. The CLI (via
// `flarestat-config`) constructs a `ZoneConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use strum::{Display, EnumString};
use url::Url;

use crate::units::BandwidthUnit;

/// Default scan interval at the presentation layer.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Floor enforced inside the fetcher regardless of caller frequency.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Request timeout for the single analytics round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Cap on rows per top-N breakdown in the dashboard query.
pub const DEFAULT_TOP_LIMIT: u32 = 10;

/// Which batched query a zone is polled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum QueryKind {
    /// Daily totals rolled up into today / week / month, plus per-window
    /// country breakdowns and web-performance figures.
    #[default]
    Rolling,
    /// Today's totals with cache/SSL splits, threats, status codes, and
    /// top-N countries, paths, and user agents.
    Dashboard,
}

/// Configuration for polling a single zone.
///
/// Built by the CLI, passed to `AnalyticsFetcher`; core never reads config files.
#[derive(Debug, Clone)]
pub struct ZoneConfig {
    /// Opaque zone identifier (the `zoneTag` filter).
    pub zone_id: String,
    /// Bearer token. Never logged.
    pub api_token: SecretString,
    /// GraphQL endpoint override; `None` means the public Cloudflare endpoint.
    pub endpoint: Option<Url>,
    /// Which query to issue each refresh.
    pub query: QueryKind,
    /// How often the background task triggers a refresh. 0 = never.
    pub refresh_interval: Duration,
    /// Minimum spacing between two network fetches.
    pub min_refresh_interval: Duration,
    /// Request timeout.
    pub timeout: Duration,
    /// Unit byte-valued metrics are presented in.
    pub bandwidth_unit: BandwidthUnit,
    /// Rows per top-N breakdown (dashboard query only).
    pub top_limit: u32,
}

impl ZoneConfig {
    /// A config with every tunable at its default.
    pub fn new(zone_id: impl Into<String>, api_token: SecretString) -> Self {
        Self {
            zone_id: zone_id.into(),
            api_token,
            endpoint: None,
            query: QueryKind::default(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            bandwidth_unit: BandwidthUnit::default(),
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }

    /// The endpoint to POST to, falling back to the public one.
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        match &self.endpoint {
            Some(url) => Ok(url.clone()),
            None => Url::parse(flarestat_api::DEFAULT_ENDPOINT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ZoneConfig::new("zone", SecretString::from("t".to_string()));
        assert_eq!(cfg.refresh_interval.as_secs(), 300);
        assert_eq!(cfg.min_refresh_interval.as_secs(), 60);
        assert_eq!(cfg.bandwidth_unit, BandwidthUnit::Megabytes);
        assert_eq!(cfg.query, QueryKind::Rolling);
        assert_eq!(
            cfg.endpoint().map(|u| u.to_string()).ok().as_deref(),
            Some("https://api.cloudflare.com/client/v4/graphql")
        );
    }

    #[test]
    fn query_kind_parses_case_insensitively() {
        assert_eq!("Dashboard".parse::<QueryKind>().ok(), Some(QueryKind::Dashboard));
        assert_eq!("rolling".parse::<QueryKind>().ok(), Some(QueryKind::Rolling));
        assert!("hourly".parse::<QueryKind>().is_err());
        assert_eq!(QueryKind::Dashboard.to_string(), "dashboard");
    }
}
