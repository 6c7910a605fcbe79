use rusqlite::{Connection, Result};

/// Create the ingestion tables and the KPI fact table. Safe to call on every open (idempotent).
pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    create_shifts_table(conn)?;
    create_breaks_table(conn)?;
    create_allowances_table(conn)?;
    create_award_interpretations_table(conn)?;
    create_kpis_table(conn)?;
    Ok(())
}

fn create_shifts_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS shifts (
            shift_id      TEXT PRIMARY KEY,
            shift_date    TEXT NOT NULL,
            shift_start   TEXT,
            shift_finish  TEXT,
            shift_cost    REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_shifts_date
            ON shifts(shift_date);",
    )
}

/// Breaks hang off a shift and vanish with it.
fn create_breaks_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS breaks (
            break_id      TEXT PRIMARY KEY,
            shift_id      TEXT NOT NULL REFERENCES shifts(shift_id) ON DELETE CASCADE,
            break_start   TEXT,
            break_finish  TEXT,
            is_paid       INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_breaks_shift
            ON breaks(shift_id);",
    )
}

fn create_allowances_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS allowances (
            allowance_id     TEXT PRIMARY KEY,
            shift_id         TEXT NOT NULL REFERENCES shifts(shift_id) ON DELETE CASCADE,
            allowance_value  REAL NOT NULL,
            allowance_cost   REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_allowances_shift
            ON allowances(shift_id);",
    )
}

fn create_award_interpretations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS award_interpretations (
            award_id     TEXT PRIMARY KEY,
            shift_id     TEXT NOT NULL REFERENCES shifts(shift_id) ON DELETE CASCADE,
            award_date   TEXT NOT NULL,
            award_units  REAL NOT NULL,
            award_cost   REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_award_interpretations_shift
            ON award_interpretations(shift_id);",
    )
}

/// Flat fact table. No uniqueness on (name, date): every run appends its own six rows.
fn create_kpis_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kpis (
            kpi_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            kpi_name   TEXT NOT NULL,
            kpi_date   TEXT NOT NULL,
            kpi_value  REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_kpis_name_date
            ON kpis(kpi_name, kpi_date);",
    )
}
