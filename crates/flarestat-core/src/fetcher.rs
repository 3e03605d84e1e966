// ── Analytics fetcher ──
//
// One instance per zone. Owns the credentials, issues one batched query
// per refresh, and holds the latest snapshot. All readers of a zone go
// through the same throttle gate, so at most one request is in flight
// and at most one request starts per minimum interval.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use flarestat_api::{GraphqlClient, GraphqlResponse, TransportConfig};

use crate::config::{QueryKind, ZoneConfig};
use crate::error::CoreError;
use crate::parse;
use crate::snapshot::Snapshot;
use crate::window::RefreshWindow;

/// What a call to [`AnalyticsFetcher::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A request was made and the snapshot replaced.
    Refreshed,
    /// The minimum interval has not elapsed; nothing was done.
    Throttled,
    /// Another caller is mid-fetch; nothing was done.
    InFlight,
    /// A request was made and failed; the previous snapshot is kept.
    Failed,
}

/// Throttled, shared fetch-and-parse for one zone.
pub struct AnalyticsFetcher {
    zone_id: String,
    client: GraphqlClient,
    query: QueryKind,
    top_limit: u32,
    min_interval: Duration,
    /// Start of the last attempted fetch. Held across the fetch so the
    /// check-and-mark-and-fetch sequence is atomic.
    gate: Mutex<Option<Instant>>,
    snapshot: watch::Sender<Arc<Snapshot>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    last_error: ArcSwapOption<CoreError>,
}

impl AnalyticsFetcher {
    /// Build the HTTP client for `config`. The snapshot starts empty.
    pub fn new(config: &ZoneConfig) -> Result<Self, CoreError> {
        let endpoint = config.endpoint().map_err(|e| CoreError::Config {
            message: format!("invalid endpoint: {e}"),
        })?;
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = GraphqlClient::from_token(endpoint, &config.api_token, &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Use a pre-built client (tests, custom transports).
    pub fn with_client(config: &ZoneConfig, client: GraphqlClient) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::new()));
        let (last_refresh, _) = watch::channel(None);
        Self {
            zone_id: config.zone_id.clone(),
            client,
            query: config.query,
            top_limit: config.top_limit,
            min_interval: config.min_refresh_interval,
            gate: Mutex::new(None),
            snapshot,
            last_refresh,
            last_error: ArcSwapOption::empty(),
        }
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn query(&self) -> QueryKind {
        self.query
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch and replace the snapshot, unless throttled or already in
    /// flight. Never returns an error: failures are logged, recorded in
    /// [`last_error`](Self::last_error), and leave the snapshot as it was.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(mut last_attempt) = self.gate.try_lock() else {
            debug!(zone = %self.zone_id, "refresh already in flight");
            return RefreshOutcome::InFlight;
        };

        if let Some(at) = *last_attempt {
            if at.elapsed() < self.min_interval {
                debug!(zone = %self.zone_id, "refresh throttled");
                return RefreshOutcome::Throttled;
            }
        }
        *last_attempt = Some(Instant::now());

        match self.fetch().await {
            Ok(snapshot) => {
                info!(zone = %self.zone_id, keys = snapshot.len(), "analytics refreshed");
                self.snapshot.send_replace(Arc::new(snapshot));
                self.last_refresh.send_replace(Some(Utc::now()));
                self.last_error.store(None);
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                error!(zone = %self.zone_id, error = %e, "analytics refresh failed");
                self.last_error.store(Some(Arc::new(e)));
                RefreshOutcome::Failed
            }
        }
    }

    async fn fetch(&self) -> Result<Snapshot, CoreError> {
        let window = RefreshWindow::now();
        let response = match self.query {
            QueryKind::Rolling => {
                let vars = window.rolling_variables(&self.zone_id);
                self.client.rolling_analytics(&vars).await?
            }
            QueryKind::Dashboard => {
                let vars = window.dashboard_variables(&self.zone_id, self.top_limit);
                self.client.dashboard_totals(&vars).await?
            }
        };
        self.parse(&response, &window)
    }

    fn parse(&self, response: &GraphqlResponse, window: &RefreshWindow) -> Result<Snapshot, CoreError> {
        if response.has_errors() {
            warn!(
                zone = %self.zone_id,
                errors = %response.error_summary(),
                "analytics query returned errors"
            );
        }

        if response.data().is_none() {
            return Err(CoreError::NoData {
                errors: response.errors.iter().map(ToString::to_string).collect(),
            });
        }

        let empty = Value::Object(Map::new());
        let zone = response.first_zone().unwrap_or_else(|| {
            warn!(zone = %self.zone_id, "response has no zone entry");
            &empty
        });

        Ok(match self.query {
            QueryKind::Rolling => parse::rolling(zone, window),
            QueryKind::Dashboard => parse::dashboard(zone),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The latest snapshot. Cheap; never blocks on a fetch.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Notified every time a refresh replaces the snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    /// Wall-clock time of the last successful refresh.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// The error from the most recent attempt, cleared on success.
    pub fn last_error(&self) -> Option<Arc<CoreError>> {
        self.last_error.load_full()
    }
}

impl std::fmt::Debug for AnalyticsFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsFetcher")
            .field("zone_id", &self.zone_id)
            .field("query", &self.query)
            .field("min_interval", &self.min_interval)
            .finish_non_exhaustive()
    }
}

// ── Background refresh ───────────────────────────────────────────────

/// Refresh `fetcher` every `interval` until `cancel` fires. The first
/// refresh happens immediately.
///
/// A zero interval spawns a task that only waits for cancellation.
pub fn spawn_refresh_task(
    fetcher: Arc<AnalyticsFetcher>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(refresh_task(fetcher, interval, cancel))
}

async fn refresh_task(fetcher: Arc<AnalyticsFetcher>, interval: Duration, cancel: CancellationToken) {
    if interval.is_zero() {
        cancel.cancelled().await;
        return;
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let outcome = fetcher.refresh().await;
                debug!(zone = %fetcher.zone_id, ?outcome, "scheduled refresh");
            }
        }
    }
}
