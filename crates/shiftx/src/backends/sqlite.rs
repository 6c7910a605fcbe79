// ai
//! # 🗄️ THE SQLITE SINK
//!
//! 🎬 COLD OPEN - INT. A SINGLE FILE ON DISK - IT HAS SEEN THINGS
//!
//! Four tables of rostering data and one table of KPIs, all living in one SQLite file (or in
//! RAM, if you say `:memory:` and mean it). The sink owns the connection. Nobody else touches it.
//!
//! rusqlite is synchronous. tokio is not. So every call hops onto the blocking pool via
//! [`SqliteSink::with_conn`], grabs the connection behind an async mutex, does its thing, and
//! hops back. The runtime threads never block on disk I/O.
//!
//! 🧠 Knowledge graph:
//! - `schema` → idempotent DDL, run on every open
//! - `page_writer` → one page, one transaction
//! - `kpis` → six aggregates, appended once per run
//! - `reset` lives here: two DELETEs, one transaction, cascades do the rest 🦆

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::common::{KpiSnapshot, PageRecords, PageWriteReport};
use crate::error::EtlError;

mod kpis;
mod page_writer;
mod schema;

// 🗄️ SqliteSinkConfig - where the rows go to live out their days.
#[derive(Debug, Deserialize, Clone)]
pub struct SqliteSinkConfig {
    /// 📁 Path to the database file. Created on first open. `:memory:` for a throwaway store.
    pub db_path: String,
    /// ⏱️ How long a write waits on a locked database before giving up with a store error.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// 🗄️ The sink. Cheap to clone, every clone shares the one connection.
#[derive(Debug, Clone)]
pub(crate) struct SqliteSink {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSink {
    /// 🚀 Open (or create) the store, switch on foreign keys, and make sure the schema exists.
    pub(crate) async fn open(config: &SqliteSinkConfig) -> Result<Self, EtlError> {
        let config = config.clone();
        let conn = tokio::task::spawn_blocking(move || open_connection(&config)).await??;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 🧵 Run `f` against the connection on the blocking pool.
    ///
    /// The async mutex serializes callers, `blocking_lock` is safe because we're already off the
    /// runtime threads by the time it runs.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, EtlError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, EtlError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.blocking_lock();
            f(&mut guard)
        })
        .await?
    }

    /// 📝 Persist one page. All four tables or none of them.
    pub(crate) async fn write_page(&self, records: PageRecords) -> Result<PageWriteReport, EtlError> {
        self.with_conn(move |conn| page_writer::write_page(conn, &records))
            .await
    }

    /// 📊 Compute and append the six KPIs under `run_date`.
    pub(crate) async fn compute_kpis(&self, run_date: NaiveDate) -> Result<KpiSnapshot, EtlError> {
        self.with_conn(move |conn| kpis::compute_and_append(conn, run_date))
            .await
    }

    /// 🧹 Wipe every shift (children cascade along) and every KPI row. Schema stays.
    ///
    /// Idempotent: resetting an empty store succeeds and changes nothing.
    pub(crate) async fn reset(&self) -> Result<(), EtlError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let shifts = tx.execute("DELETE FROM shifts", [])?;
            let kpis = tx.execute("DELETE FROM kpis", [])?;
            tx.commit()?;
            info!("🧹 reset removed {shifts} shifts (and their children) and {kpis} KPI rows");
            Ok(())
        })
        .await
    }

    #[cfg(test)]
    pub(crate) async fn count_rows(&self, table: &'static str) -> Result<i64, EtlError> {
        self.with_conn(move |conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
        })
        .await
    }

    #[cfg(test)]
    pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<(), EtlError> {
        self.with_conn(move |conn| Ok(conn.execute_batch(sql)?)).await
    }
}

// -- lets three KPI rows in, then refuses the fourth
#[cfg(test)]
pub(crate) const FOURTH_KPI_ROW_ABORTS: &str = "
    CREATE TRIGGER kpis_run_out_of_room BEFORE INSERT ON kpis
    WHEN (SELECT COUNT(*) FROM kpis) >= 3
    BEGIN
        SELECT RAISE(ABORT, 'kpis table is full of feelings');
    END;";

fn open_connection(config: &SqliteSinkConfig) -> Result<Connection, EtlError> {
    debug!("🗄️ opening store at '{}'", config.db_path);
    let conn = Connection::open(&config.db_path)?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    // -- off by default in SQLite, per connection. without it ON DELETE CASCADE is decoration.
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn)?;
    Ok(conn)
}
