// ai
//! 📊 The KPI aggregator - six questions, asked once, answered in SQL.
//!
//! 🎬 *[ingestion is over. the pages have stopped coming. someone in payroll asks "so, how did
//! we do?" and this module clears its throat.]*
//!
//! Every KPI is a single query over the whole store. Every query is wrapped so that "no data"
//! comes back as `0`, never as NULL. Values are rounded to two decimals, then the six rows are
//! appended to `kpis` under the run date, all inside one transaction. Reading and inserting
//! share the transaction, so the snapshot we return is exactly what got filed.
//!
//! Appending is deliberate: a second run on the same day files a second batch of six. The fact
//! table is a diary, not a whiteboard. 🦆

use chrono::NaiveDate;
use rusqlite::{Connection, Transaction, params};
use tracing::{debug, info};

use crate::common::{KpiSnapshot, round_to};
use crate::error::EtlError;

const KPI_DECIMALS: i32 = 2;

// -- julianday differences are in days. ×1440 for minutes, ×24 for hours.
const MEAN_BREAK_LENGTH_IN_MINUTES: &str = "
    SELECT COALESCE(AVG((julianday(break_finish) - julianday(break_start)) * 1440.0), 0.0)
    FROM breaks";

const MEAN_SHIFT_COST: &str = "
    SELECT COALESCE(AVG(shift_cost), 0.0)
    FROM shifts";

const MAX_ALLOWANCE_COST_14D: &str = "
    SELECT COALESCE(MAX(a.allowance_cost), 0.0)
    FROM allowances a
    JOIN shifts s ON s.shift_id = a.shift_id
    WHERE s.shift_date BETWEEN date(?1, '-14 days') AND ?1";

/// 🧮 Longest run of consecutive shifts (by date) without a break.
///
/// A running count of "rows that had a break" splits the date-ordered shifts into groups. Each
/// group opens with the shift that had the break (except group 0, which opens the dataset),
/// so the break-free run length is the group size minus that opener.
const MAX_BREAK_FREE_SHIFT_PERIOD_IN_DAYS: &str = "
    WITH grouped AS (
        SELECT SUM(CASE WHEN b.break_id IS NULL THEN 0 ELSE 1 END)
                   OVER (ORDER BY s.shift_date) AS grp
        FROM shifts s
        LEFT JOIN breaks b ON b.shift_id = s.shift_id
    ),
    runs AS (
        SELECT COUNT(*) - CASE WHEN grp = 0 THEN 0 ELSE 1 END AS run_length
        FROM grouped
        GROUP BY grp
    )
    SELECT COALESCE(MAX(run_length), 0)
    FROM runs";

const MIN_SHIFT_LENGTH_IN_HOURS: &str = "
    SELECT COALESCE(MIN((julianday(shift_finish) - julianday(shift_start)) * 24.0), 0.0)
    FROM shifts";

const TOTAL_NUMBER_OF_PAID_BREAKS: &str = "
    SELECT COUNT(*)
    FROM breaks
    WHERE is_paid = 1";

const INSERT_KPI: &str = "INSERT INTO kpis (kpi_name, kpi_date, kpi_value) VALUES (?1, ?2, ?3)";

/// 🚀 Compute the six KPIs over everything stored and append them under `run_date`.
///
/// # Errors
/// 💀 `EtlError::Aggregation` if any query or the insert fails. Nothing is appended in that case.
pub(crate) fn compute_and_append(conn: &mut Connection, run_date: NaiveDate) -> Result<KpiSnapshot, EtlError> {
    let tx = conn.transaction().map_err(EtlError::Aggregation)?;
    let snapshot = read_snapshot(&tx, run_date).map_err(EtlError::Aggregation)?;
    append_snapshot(&tx, &snapshot).map_err(EtlError::Aggregation)?;
    tx.commit().map_err(EtlError::Aggregation)?;

    info!("📊 appended {} KPI rows for {}", snapshot.entries().count(), run_date);
    Ok(snapshot)
}

fn read_snapshot(tx: &Transaction<'_>, run_date: NaiveDate) -> rusqlite::Result<KpiSnapshot> {
    let scalar = |sql: &str| -> rusqlite::Result<f64> {
        let raw: f64 = tx.query_row(sql, [], |row| row.get(0))?;
        Ok(round_to(raw, KPI_DECIMALS))
    };

    let max_allowance_cost_14d: f64 = tx.query_row(MAX_ALLOWANCE_COST_14D, [run_date], |row| row.get(0))?;

    let snapshot = KpiSnapshot {
        kpi_date: run_date,
        mean_break_length_in_minutes: scalar(MEAN_BREAK_LENGTH_IN_MINUTES)?,
        mean_shift_cost: scalar(MEAN_SHIFT_COST)?,
        max_allowance_cost_14d: round_to(max_allowance_cost_14d, KPI_DECIMALS),
        max_break_free_shift_period_in_days: scalar(MAX_BREAK_FREE_SHIFT_PERIOD_IN_DAYS)?,
        min_shift_length_in_hours: scalar(MIN_SHIFT_LENGTH_IN_HOURS)?,
        total_number_of_paid_breaks: scalar(TOTAL_NUMBER_OF_PAID_BREAKS)?,
    };
    debug!("📊 snapshot for {run_date}: {snapshot:?}");
    Ok(snapshot)
}

fn append_snapshot(tx: &Transaction<'_>, snapshot: &KpiSnapshot) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare_cached(INSERT_KPI)?;
    for (name, value) in snapshot.entries() {
        stmt.execute(params![name.as_str(), snapshot.kpi_date, value])?;
    }
    Ok(())
}
