// ai
//! 💀 Errors - the five stages of grief, but typed.
//!
//! 🎬 *[a page arrives. it is missing `results`. nobody is surprised.]*
//!
//! Every way a run can go sideways lands in exactly one [`EtlError`] variant, so the trigger
//! layer can tell "the API is down" apart from "the API lied about its shape" apart from
//! "the database said no". The library speaks `EtlError`. The CLI wraps it in `anyhow` and
//! cries in a structured manner.
//!
//! 🧠 Knowledge graph:
//! - `Fetch` → raised by `backends::http_source` (and the in-memory source on unknown URLs)
//! - `StructuralFormat` → raised by `transforms` and `envelope` before any write happens
//! - `WriteConflict` / `Store` → raised by `backends::sqlite::page_writer`, page rolled back
//! - `Aggregation` → raised by `backends::sqlite::kpis`, KPI batch rolled back
//! - `InvalidUrl` → configured start URL or envelope `next`/`base` that won't parse
//! - `Blocking` → the blocking-pool task that owns the SQLite call fell over 🦆

use thiserror::Error;

/// 🏷️ The one error type to rule the pipeline.
///
/// Each variant carries a human-readable message. None of them are swallowed: if you got one,
/// the run reports failure. That's the deal.
#[derive(Debug, Error)]
pub enum EtlError {
    /// 📡 Network, transport, non-2xx, or "that was not JSON". Terminates the run.
    #[error("💀 fetching page '{url}' failed: {reason}")]
    Fetch { url: String, reason: String },

    /// 🧩 The page body is not shaped like a shift page. Nothing was written for it.
    #[error("💀 page body has an unexpected shape: {0}")]
    StructuralFormat(String),

    /// 🚧 A constraint said no (duplicate id, orphaned foreign key). The page was rolled back.
    #[error("💀 insert into '{table}' violated a constraint, page rolled back: {source}")]
    WriteConflict {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// 📊 The KPI batch could not be computed or inserted. Rolled back as a unit.
    #[error("💀 KPI aggregation failed and was rolled back: {0}")]
    Aggregation(#[source] rusqlite::Error),

    /// 🗄️ Any other SQLite failure: open, schema bootstrap, reset, I/O, busy.
    #[error("💀 store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// 🔗 A URL that refuses to be a URL.
    #[error("💀 '{url}' is not a usable URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 🧵 The blocking task running a database call panicked or was cancelled.
    #[error("💀 blocking database task did not finish: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl EtlError {
    /// 🔍 Sorts a failed insert into "constraint said no" vs "the store itself is unwell".
    pub(crate) fn from_insert(table: &'static str, source: rusqlite::Error) -> Self {
        match source.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => EtlError::WriteConflict { table, source },
            _ => EtlError::Store(source),
        }
    }

    pub(crate) fn structural(err: impl std::fmt::Display) -> Self {
        EtlError::StructuralFormat(err.to_string())
    }
}
