// ai
//! 🗓️ shiftx - a rostering API goes in, four flat tables and six KPIs come out.
//!
//! 🎬 *[a paginated API. a SQLite file. a payroll team that wants numbers by 9am.]*
//!
//! The library exposes two operations, the same two the CLI exposes:
//! - [`run`]: walk the API page by page, commit each page in its own transaction, then compute
//!   the KPIs once.
//! - [`reset`]: wipe the ingested data and the KPI history.
//!
//! Everything else (sources, the sink, the pagination state machine) stays behind this door. 🦆

pub mod app_config;
pub mod common;
pub mod error;
pub mod timestamps;
pub mod transforms;

pub(crate) mod backends;
pub(crate) mod envelope;
mod progress;
mod supervisors;

#[cfg(test)]
mod fixtures;

use chrono::{Local, NaiveDate};
use tracing::info;

pub use app_config::{AppConfig, load_config};
pub use backends::{HttpSourceConfig, SqliteSinkConfig};
pub use common::{KpiName, KpiSnapshot, PageRecords, PageWriteReport, RunSummary};
pub use error::EtlError;

use crate::backends::SourceBackend;
use crate::backends::http_source::HttpSource;
use crate::backends::sqlite::SqliteSink;
use crate::progress::RunProgress;
use crate::supervisors::Supervisor;

/// 🚀 One full run with KPIs filed under today's local date.
pub async fn run(app_config: AppConfig) -> Result<RunSummary, EtlError> {
    run_on(app_config, Local::now().date_naive()).await
}

/// 🚀 One full run with KPIs filed under `run_date`.
///
/// # Errors
/// 💀 Whatever stopped the run first. Pages committed before that point stay committed.
pub async fn run_on(app_config: AppConfig, run_date: NaiveDate) -> Result<RunSummary, EtlError> {
    let start_url = app_config.source_config.starting_url()?;
    let source = SourceBackend::Http(HttpSource::new(&app_config.source_config)?);
    let sink = SqliteSink::open(&app_config.sink_config).await?;

    Supervisor::new(source, sink, RunProgress::new())
        .run(start_url, run_date)
        .await
}

/// 🧹 Delete every shift (children cascade) and every KPI row. Safe to call on an empty store.
pub async fn reset(app_config: &AppConfig) -> Result<(), EtlError> {
    let sink = SqliteSink::open(&app_config.sink_config).await?;
    sink.reset().await?;
    info!("🧹 store at '{}' is empty", app_config.sink_config.db_path);
    Ok(())
}
