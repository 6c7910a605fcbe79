//! 🎬 *[camera pans across a rostering API that will not stop paginating]*
//! 🎬 *[dramatic orchestral music swells]*
//! 🎬 "In a world where every page says 'there's more'..."
//! 🎬 "One supervisor dared to follow the links."
//! 🎬 *[record scratch]* 🦆
//!
//! 📦 The Supervisor module - the pagination driver. Part state machine, part middle manager.
//!
//! The run is a small explicit state machine, [`PaginationState`]:
//!
//! ```text
//!   Fetching(url) ──ok──▶ Processing { url, body } ──next link──▶ Fetching(next)
//!        │                        │
//!        │ fetch error            ├──no next link──▶ Done ──▶ KPIs, exactly once
//!        ▼                        │
//!     Failed ◀──transform / write error
//! ```
//!
//! Pages go strictly one after another: one fetch, one transform, one transaction, then the
//! next fetch. `Failed` ends the run with its error and the KPI aggregator never hears about it.
//! Pages committed before the failure stay committed.
//!
//! ⚠️ The driver does not cap the number of pages. An upstream that hands out a cyclic `next`
//! chain keeps it fetching forever.
//! 🔒 DO NOT MAKE THIS PUB. `lib.rs` is the front door.

use chrono::NaiveDate;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backends::sqlite::SqliteSink;
use crate::backends::{Source, SourceBackend};
use crate::common::{PageWriteReport, RunSummary};
use crate::envelope::PageLinks;
use crate::error::EtlError;
use crate::progress::RunProgress;
use crate::transforms::transform_page;

/// 🚦 Where the run is right now. Each state owns exactly what the next step needs.
#[derive(Debug)]
pub(crate) enum PaginationState {
    /// 📡 About to GET this URL.
    Fetching(Url),
    /// 🔄 Got a body from `url`, about to transform and write it.
    Processing { url: Url, body: Value },
    /// ✅ The chain ended cleanly.
    Done,
    /// 💀 Something broke. The run is over.
    Failed(EtlError),
}

/// 📊 Running totals across committed pages.
#[derive(Debug, Default)]
struct Tally {
    pages: usize,
    rows: PageWriteReport,
}

/// 📦 The Supervisor: owns the source, the sink, and the spinner for one run.
pub(crate) struct Supervisor {
    source: SourceBackend,
    sink: SqliteSink,
    progress: RunProgress,
}

impl Supervisor {
    pub(crate) fn new(source: SourceBackend, sink: SqliteSink, progress: RunProgress) -> Self {
        Self { source, sink, progress }
    }

    /// 🚀 Walk the chain from `start_url` to the end, then compute KPIs under `run_date`.
    ///
    /// # Errors
    /// 💀 The first error any page produces, unchanged. Or `EtlError::Aggregation` if every page
    /// made it but the KPI batch did not.
    pub(crate) async fn run(&self, start_url: Url, run_date: NaiveDate) -> Result<RunSummary, EtlError> {
        info!("🚀 run starting at {start_url} for {run_date}");
        let mut tally = Tally::default();
        let mut state = PaginationState::Fetching(start_url);

        loop {
            state = match state {
                PaginationState::Fetching(url) => self.fetch(url, tally.pages + 1).await,
                PaginationState::Processing { url, body } => self.process(url, body, &mut tally).await,
                PaginationState::Done => break,
                PaginationState::Failed(err) => {
                    warn!("💀 run stopped after {} committed pages: {err}", tally.pages);
                    self.progress.abandon(&err.to_string());
                    return Err(err);
                }
            };
        }

        self.progress.aggregating();
        let kpis = match self.sink.compute_kpis(run_date).await {
            Ok(kpis) => kpis,
            Err(err) => {
                self.progress.abandon(&err.to_string());
                return Err(err);
            }
        };
        for (name, value) in kpis.entries() {
            info!("📊 {name} = {value}");
        }

        let summary = RunSummary {
            pages: tally.pages,
            shifts: tally.rows.shifts,
            breaks: tally.rows.breaks,
            allowances: tally.rows.allowances,
            award_interpretations: tally.rows.award_interpretations,
            kpis,
        };
        self.progress.finish(&summary);
        info!("🏁 run finished: {} pages", summary.pages);
        Ok(summary)
    }

    async fn fetch(&self, url: Url, page_number: usize) -> PaginationState {
        self.progress.fetching(page_number, &url);
        debug!("📡 fetching page {page_number} from {url}");
        match self.source.fetch_page(&url).await {
            Ok(body) => PaginationState::Processing { url, body },
            Err(err) => PaginationState::Failed(err),
        }
    }

    /// 🔄 Transform, then commit, then decide where to go next.
    ///
    /// The envelope and the results are both parsed before the write, so a structurally bad
    /// page never opens a transaction.
    async fn process(&self, url: Url, body: Value, tally: &mut Tally) -> PaginationState {
        let parsed = PageLinks::from_page(&body)
            .and_then(|links| links.resolve_next(&url))
            .and_then(|next| transform_page(&body).map(|records| (next, records)));
        let (next, records) = match parsed {
            Ok(parsed) => parsed,
            Err(err) => return PaginationState::Failed(err),
        };
        debug!("🔄 page from {url} flattened into {:?}", records.row_counts());

        match self.sink.write_page(records).await {
            Ok(report) => {
                tally.pages += 1;
                tally.rows += report;
                self.progress.page_committed(tally.pages, &tally.rows);
            }
            Err(err) => {
                warn!("🔄 page from {url} rolled back");
                return PaginationState::Failed(err);
            }
        }

        match next {
            Some(next) => {
                debug!("🔗 next page: {next}");
                PaginationState::Fetching(next)
            }
            None => PaginationState::Done,
        }
    }
}
