//! `flarestat snapshot`: the raw key → value mapping after one refresh.

use std::sync::Arc;

use tabled::{Table, Tabled, settings::Style};

use flarestat_core::{AnalyticsFetcher, Snapshot};

use crate::cli::{GlobalOpts, SnapshotArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub async fn handle(args: SnapshotArgs, mut resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(query) = args.query {
        resolved.zone.query = query.into();
    }
    let fetcher = Arc::new(AnalyticsFetcher::new(&resolved.zone)?);
    super::refresh_once(&fetcher).await?;

    let snapshot = fetcher.snapshot();
    let out = output::render_single(&global.output, snapshot.as_ref(), table, plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn table(snapshot: &Snapshot) -> String {
    let rows: Vec<EntryRow> = snapshot
        .iter()
        .map(|(key, value)| EntryRow {
            key: key.to_owned(),
            value: output::format_value(value),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn plain(snapshot: &Snapshot) -> String {
    snapshot
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
