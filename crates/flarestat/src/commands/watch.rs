//! `flarestat watch`: re-print on every scheduled refresh until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use flarestat_core::{AnalyticsFetcher, spawn_refresh_task};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::metrics;

pub async fn handle(args: WatchArgs, mut resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(query) = args.metrics.query {
        resolved.zone.query = query.into();
    }
    let interval = args
        .interval
        .map_or(resolved.zone.refresh_interval, Duration::from_secs);
    if interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let fetcher = Arc::new(AnalyticsFetcher::new(&resolved.zone)?);
    let mut updates = fetcher.subscribe();
    let cancel = CancellationToken::new();
    let task = spawn_refresh_task(Arc::clone(&fetcher), interval, cancel.clone());
    info!(zone = %resolved.zone.zone_id, interval_secs = interval.as_secs(), "watching");

    let color = output::should_color(&global.color);
    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let reports = metrics::collect(&fetcher, &resolved, &args.metrics);
                let body = metrics::render(&reports, global)?;
                if matches!(global.output, OutputFormat::Table) {
                    let stamp = fetcher
                        .last_refresh()
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_default();
                    let title = format!("{} · {stamp}", resolved.zone.zone_id);
                    output::print_output(&output::heading(&title, color), global.quiet);
                }
                output::print_output(&body, global.quiet);
            }
        }
    }

    cancel.cancel();
    let _ = task.await;
    Ok(())
}
