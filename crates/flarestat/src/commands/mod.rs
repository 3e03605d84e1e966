//! Command handlers.

pub mod config_cmd;
pub mod metrics;
pub mod snapshot;
pub mod watch;

use std::sync::Arc;

use flarestat_core::{AnalyticsFetcher, RefreshOutcome};

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Route a network command. Config and completions are handled in `main`.
pub async fn dispatch(cmd: Command, resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Metrics(args) => metrics::handle(args, resolved, global).await,
        Command::Watch(args) => watch::handle(args, resolved, global).await,
        Command::Snapshot(args) => snapshot::handle(args, resolved, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "not a network command".into(),
        }),
    }
}

/// Refresh once, turning a failed fetch into an error. The fetcher itself
/// never fails outward; a one-shot command should.
pub async fn refresh_once(fetcher: &Arc<AnalyticsFetcher>) -> Result<(), CliError> {
    match fetcher.refresh().await {
        RefreshOutcome::Failed => Err(fetcher
            .last_error()
            .map_or_else(
                || CliError::NoData {
                    message: "refresh failed".into(),
                },
                |e| CliError::from((*e).clone()),
            )),
        _ => Ok(()),
    }
}
