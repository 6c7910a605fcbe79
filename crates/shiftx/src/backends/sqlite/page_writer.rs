// ai
//! 🗄️ The page writer - one page, one transaction, four tables, zero half-measures.
//!
//! 🎬 *[a page of rows arrives. the transaction opens. everyone holds their breath.]*
//!
//! Write order is fixed: shifts → breaks → allowances → award_interpretations. Parents before
//! children, because the foreign keys have opinions. If any insert fails, the transaction is
//! dropped without commit and rusqlite rolls it back: none of the four tables keep a single row
//! from this page. The commit is the atomicity boundary. Either all four record sets are
//! visible, or none are. 🦆

use rusqlite::{CachedStatement, Connection, Transaction, params};
use tracing::info;

use crate::common::{AllowanceRow, AwardInterpretationRow, BreakRow, PageRecords, PageWriteReport, ShiftRow};
use crate::error::EtlError;

/// 📝 A row that knows which table it belongs to and how to bind itself to that table's INSERT.
trait TableRow {
    const TABLE: &'static str;
    const INSERT_SQL: &'static str;

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize>;
}

impl TableRow for ShiftRow {
    const TABLE: &'static str = "shifts";
    const INSERT_SQL: &'static str = "INSERT INTO shifts (shift_id, shift_date, shift_start, shift_finish, shift_cost)
         VALUES (?1, ?2, ?3, ?4, ?5)";

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.shift_id,
            self.shift_date,
            self.shift_start,
            self.shift_finish,
            self.shift_cost
        ])
    }
}

impl TableRow for BreakRow {
    const TABLE: &'static str = "breaks";
    const INSERT_SQL: &'static str = "INSERT INTO breaks (break_id, shift_id, break_start, break_finish, is_paid)
         VALUES (?1, ?2, ?3, ?4, ?5)";

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.break_id,
            self.shift_id,
            self.break_start,
            self.break_finish,
            self.is_paid
        ])
    }
}

impl TableRow for AllowanceRow {
    const TABLE: &'static str = "allowances";
    const INSERT_SQL: &'static str = "INSERT INTO allowances (allowance_id, shift_id, allowance_value, allowance_cost)
         VALUES (?1, ?2, ?3, ?4)";

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.allowance_id,
            self.shift_id,
            self.allowance_value,
            self.allowance_cost
        ])
    }
}

impl TableRow for AwardInterpretationRow {
    const TABLE: &'static str = "award_interpretations";
    const INSERT_SQL: &'static str = "INSERT INTO award_interpretations (award_id, shift_id, award_date, award_units, award_cost)
         VALUES (?1, ?2, ?3, ?4, ?5)";

    fn insert(&self, stmt: &mut CachedStatement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.award_id,
            self.shift_id,
            self.award_date,
            self.award_units,
            self.award_cost
        ])
    }
}

/// 🚀 Write one page's four record sets atomically.
///
/// # Errors
/// 💀 `EtlError::WriteConflict` naming the table when a constraint says no (duplicate id from a
/// prior page, duplicate id within this page). `EtlError::Store` for everything else, including
/// a failed commit. Either way nothing from this page survives.
pub(crate) fn write_page(conn: &mut Connection, records: &PageRecords) -> Result<PageWriteReport, EtlError> {
    let tx = conn.transaction()?;

    let report = PageWriteReport {
        shifts: insert_all(&tx, &records.shifts)?,
        breaks: insert_all(&tx, &records.breaks)?,
        allowances: insert_all(&tx, &records.allowances)?,
        award_interpretations: insert_all(&tx, &records.award_interpretations)?,
    };

    tx.commit()?;

    info!("✅ inserted {} rows into {}", report.shifts, ShiftRow::TABLE);
    info!("✅ inserted {} rows into {}", report.breaks, BreakRow::TABLE);
    info!("✅ inserted {} rows into {}", report.allowances, AllowanceRow::TABLE);
    info!(
        "✅ inserted {} rows into {}",
        report.award_interpretations,
        AwardInterpretationRow::TABLE
    );
    Ok(report)
}

// -- empty sets never touch the database. no statement, no row, no drama.
fn insert_all<R: TableRow>(tx: &Transaction<'_>, rows: &[R]) -> Result<usize, EtlError> {
    if rows.is_empty() {
        return Ok(0);
    }
    let mut stmt = tx.prepare_cached(R::INSERT_SQL)?;
    for row in rows {
        row.insert(&mut stmt)
            .map_err(|err| EtlError::from_insert(R::TABLE, err))?;
    }
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::sqlite::schema::init_schema;
    use crate::fixtures::{BREAK_A, page_with_links, shift_a, shift_b, the_two_shift_page};
    use crate::transforms::transform_page;
    use serde_json::json;

    fn fresh_store() -> anyhow::Result<Connection> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        init_schema(&conn)?;
        Ok(conn)
    }

    fn count(conn: &Connection, table: &str) -> anyhow::Result<i64> {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
    }

    fn counts(conn: &Connection) -> anyhow::Result<[i64; 4]> {
        Ok([
            count(conn, "shifts")?,
            count(conn, "breaks")?,
            count(conn, "allowances")?,
            count(conn, "award_interpretations")?,
        ])
    }

    #[test]
    fn the_one_where_a_page_lands_in_all_four_tables() -> anyhow::Result<()> {
        let mut conn = fresh_store()?;
        let report = write_page(&mut conn, &transform_page(&the_two_shift_page())?)?;

        assert_eq!(
            report,
            PageWriteReport { shifts: 2, breaks: 2, allowances: 3, award_interpretations: 2 }
        );
        assert_eq!(counts(&conn)?, [2, 2, 3, 2]);
        Ok(())
    }

    #[test]
    fn the_one_where_timestamps_keep_their_milliseconds_on_disk() -> anyhow::Result<()> {
        let mut conn = fresh_store()?;
        write_page(&mut conn, &transform_page(&the_two_shift_page())?)?;

        let stored: String = conn.query_row(
            "SELECT break_finish FROM breaks WHERE break_id = ?1",
            [BREAK_A],
            |row| row.get(0),
        )?;
        assert!(stored.starts_with("2023-11-27 12:10:05.277"), "{stored}");
        Ok(())
    }

    #[test]
    fn the_one_where_a_recycled_break_id_takes_the_whole_page_down_with_it() -> anyhow::Result<()> {
        let mut conn = fresh_store()?;
        write_page(&mut conn, &transform_page(&page_with_links(vec![shift_a()], json!({})))?)?;
        let before = counts(&conn)?;

        // -- page two: a brand new shift whose break reuses page one's break id
        let mut sneaky = shift_b();
        sneaky["breaks"][0]["id"] = json!(BREAK_A);
        let outcome = write_page(&mut conn, &transform_page(&page_with_links(vec![sneaky], json!({})))?);

        match outcome {
            Err(EtlError::WriteConflict { table, .. }) => assert_eq!(table, "breaks"),
            other => panic!("💀 expected a write conflict on breaks, got {other:?}"),
        }
        // -- the shift insert that succeeded before the break blew up is gone too
        assert_eq!(counts(&conn)?, before);
        assert_eq!(before, [1, 1, 3, 0]);
        Ok(())
    }

    #[test]
    fn the_one_where_two_shifts_on_one_page_share_a_break_id() -> anyhow::Result<()> {
        let mut conn = fresh_store()?;
        let mut twin = shift_b();
        twin["breaks"][0]["id"] = json!(BREAK_A);
        let page = page_with_links(vec![shift_a(), twin], json!({}));

        let outcome = write_page(&mut conn, &transform_page(&page)?);

        assert!(matches!(outcome, Err(EtlError::WriteConflict { table: "breaks", .. })));
        assert_eq!(counts(&conn)?, [0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn the_one_where_the_same_page_twice_is_a_conflict_not_a_duplicate() -> anyhow::Result<()> {
        let mut conn = fresh_store()?;
        let records = transform_page(&the_two_shift_page())?;
        write_page(&mut conn, &records)?;

        let outcome = write_page(&mut conn, &records);

        assert!(matches!(outcome, Err(EtlError::WriteConflict { table: "shifts", .. })));
        assert_eq!(counts(&conn)?, [2, 2, 3, 2]);
        Ok(())
    }

    #[test]
    fn the_one_where_an_empty_page_is_a_perfectly_fine_page() -> anyhow::Result<()> {
        let mut conn = fresh_store()?;
        let report = write_page(&mut conn, &PageRecords::default())?;

        assert_eq!(report, PageWriteReport::default());
        assert_eq!(count(&conn, "shifts")?, 0);
        Ok(())
    }
}
