// ai
//! 🔄 Transforms - nested JSON goes in, four flat tables come out 🎭🚀
//!
//! 🎬 COLD OPEN - INT. PAYROLL - THE NIGHT BEFORE PAY DAY
//!
//! "It's just JSON to rows," they said. "How hard can it be?"
//! (Narrator: the rows had foreign keys. The JSON did not.)
//!
//! ## Architecture 📐
//!
//! ```text
//!   one page body                    PageRecords (page-scoped)
//!  ┌────────────────────┐          ┌──────────────────────────┐
//!  │ results[]          │          │ shifts                   │
//!  │  ├─ breaks[]       │ ───────▶ │ breaks      (shift_id)   │
//!  │  ├─ allowances[]   │          │ allowances  (shift_id)   │
//!  │  └─ award_interps[]│          │ award_interpretations    │
//!  └────────────────────┘          └──────────────────────────┘
//! ```
//!
//! ## Rules of the road 🧠
//! - shift cost = round(Σ allowance.cost + Σ award.cost, 4); empty lists add 0
//! - `id` → `<table>_id`; allowances `value`/`cost` → `allowance_value`/`allowance_cost`;
//!   awards `date`/`units`/`cost` → `award_date`/`award_units`/`award_cost`
//! - unmapped allowance/award keys pass through unchanged
//! - any missing required key fails the whole page. No partial records. No "mostly fine".
//!
//! Pure function. Same page in, same rows out, every single time. 🦆

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::common::{AllowanceRow, AwardInterpretationRow, BreakRow, PageRecords, ShiftRow, round_to};
use crate::envelope::{ApiAllowance, ApiAwardInterpretation, ApiShift, ShiftPageBody};
use crate::error::EtlError;
use crate::timestamps::from_epoch_millis;

const SHIFT_COST_DECIMALS: i32 = 4;

/// 📥 Flatten one page body into its four record sets.
///
/// # Errors
/// 💀 `EtlError::StructuralFormat` when `results` or any nested list is missing, or any record
/// lacks a required key or has the wrong type for it. Nothing is returned in that case, not
/// even the shifts that parsed fine before the broken one.
pub fn transform_page(body: &Value) -> Result<PageRecords, EtlError> {
    let page = ShiftPageBody::deserialize(body).map_err(EtlError::structural)?;

    let mut records = PageRecords::default();
    for shift in page.results {
        flatten_shift(shift, &mut records);
    }
    Ok(records)
}

fn flatten_shift(shift: ApiShift, records: &mut PageRecords) {
    let allowance_total: f64 = shift.allowances.iter().map(|a| a.cost).sum();
    let award_total: f64 = shift.award_interpretations.iter().map(|a| a.cost).sum();

    records.shifts.push(ShiftRow {
        shift_id: shift.id.clone(),
        shift_date: shift.date,
        shift_start: from_epoch_millis(&shift.start),
        shift_finish: from_epoch_millis(&shift.finish),
        shift_cost: round_to(allowance_total + award_total, SHIFT_COST_DECIMALS),
    });

    records.breaks.extend(shift.breaks.into_iter().map(|brk| BreakRow {
        break_id: brk.id,
        shift_id: shift.id.clone(),
        break_start: from_epoch_millis(&brk.start),
        break_finish: from_epoch_millis(&brk.finish),
        is_paid: brk.paid,
    }));

    records
        .allowances
        .extend(shift.allowances.into_iter().map(|allowance| allowance_row(allowance, &shift.id)));

    records.award_interpretations.extend(
        shift
            .award_interpretations
            .into_iter()
            .map(|award| award_row(award, &shift.id)),
    );
}

fn allowance_row(allowance: ApiAllowance, shift_id: &str) -> AllowanceRow {
    let ApiAllowance { id, value, cost, extra } = allowance;
    AllowanceRow {
        allowance_id: id,
        shift_id: shift_id.to_string(),
        allowance_value: value,
        allowance_cost: cost,
        passthrough: without_mapped_columns(extra, &["allowance_id", "shift_id", "allowance_value", "allowance_cost"]),
    }
}

fn award_row(award: ApiAwardInterpretation, shift_id: &str) -> AwardInterpretationRow {
    let ApiAwardInterpretation { id, date, units, cost, extra } = award;
    AwardInterpretationRow {
        award_id: id,
        shift_id: shift_id.to_string(),
        award_date: date,
        award_units: units,
        award_cost: cost,
        passthrough: without_mapped_columns(
            extra,
            &["award_id", "shift_id", "award_date", "award_units", "award_cost"],
        ),
    }
}

// -- the mapped columns always win. an upstream "shift_id" on an allowance does not get a vote.
fn without_mapped_columns(mut extra: Map<String, Value>, mapped: &[&str]) -> Map<String, Value> {
    for column in mapped {
        extra.remove(*column);
    }
    extra
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::the_two_shift_page;
    use serde_json::json;

    #[test]
    fn the_one_where_a_page_becomes_four_tables() -> anyhow::Result<()> {
        let records = transform_page(&the_two_shift_page())?;

        assert_eq!(records.shifts.len(), 2);
        assert_eq!(records.breaks.len(), 2);
        assert_eq!(records.allowances.len(), 3);
        assert_eq!(records.award_interpretations.len(), 2);

        // -- every child points at the shift it came from
        assert!(records.allowances.iter().all(|a| a.shift_id == "b2b9437a-28df-4ec4-8e4a-2bbdc241330b"));
        assert!(records.award_interpretations.iter().all(|a| a.shift_id == "d453dd32-4b0d-4b41-8d52-88f1142c3fe8"));
        assert_eq!(records.breaks[1].shift_id, "d453dd32-4b0d-4b41-8d52-88f1142c3fe8");
        assert!(records.breaks[1].is_paid);
        assert!(!records.breaks[0].is_paid);
        Ok(())
    }

    #[test]
    fn the_one_where_shift_cost_adds_up_even_when_a_list_is_empty() -> anyhow::Result<()> {
        let records = transform_page(&the_two_shift_page())?;

        for shift in &records.shifts {
            let allowances: f64 = records
                .allowances
                .iter()
                .filter(|a| a.shift_id == shift.shift_id)
                .map(|a| a.allowance_cost)
                .sum();
            let awards: f64 = records
                .award_interpretations
                .iter()
                .filter(|a| a.shift_id == shift.shift_id)
                .map(|a| a.award_cost)
                .sum();
            assert_eq!(shift.shift_cost, round_to(allowances + awards, 4));
        }
        assert_eq!(records.shifts[0].shift_cost, 44.4);
        assert_eq!(records.shifts[1].shift_cost, 118.7);
        Ok(())
    }

    #[test]
    fn the_one_where_a_shift_with_nothing_costs_nothing() -> anyhow::Result<()> {
        let body = json!({ "results": [
            { "id": "lonely", "date": "2023-12-01", "breaks": [], "allowances": [], "award_interpretations": [] }
        ]});

        let records = transform_page(&body)?;
        assert_eq!(records.shifts[0].shift_cost, 0.0);
        assert_eq!(records.shifts[0].shift_start, None);
        assert_eq!(records.shifts[0].shift_finish, None);
        Ok(())
    }

    #[test]
    fn the_one_where_the_same_page_always_makes_the_same_rows() -> anyhow::Result<()> {
        let page = the_two_shift_page();
        let first = transform_page(&page)?;
        let second = transform_page(&page)?;

        assert_eq!(first, second);
        assert_eq!(serde_json::to_vec(&first)?, serde_json::to_vec(&second)?);
        Ok(())
    }

    #[test]
    fn the_one_where_columns_get_their_table_prefixes() -> anyhow::Result<()> {
        let records = transform_page(&the_two_shift_page())?;

        let allowance = serde_json::to_value(&records.allowances[0])?;
        assert_eq!(
            allowance,
            json!({
                "allowance_id": "815ef6d1-3b8f-4a18-b7f8-a88b17fc695a",
                "shift_id": "b2b9437a-28df-4ec4-8e4a-2bbdc241330b",
                "allowance_value": 0.5,
                "allowance_cost": 2.5
            })
        );

        let award = serde_json::to_value(&records.award_interpretations[0])?;
        assert_eq!(
            award,
            json!({
                "award_id": "bacfb3d0-0b1f-4163-8e9f-f57f43b7a3a6",
                "shift_id": "d453dd32-4b0d-4b41-8d52-88f1142c3fe8",
                "award_date": "2023-11-28",
                "award_units": 1.0,
                "award_cost": 62.8
            })
        );
        Ok(())
    }

    #[test]
    fn the_one_where_unmapped_keys_just_come_along_for_the_ride() -> anyhow::Result<()> {
        let body = json!({ "results": [{
            "id": "s1", "date": "2023-12-01", "breaks": [],
            "allowances": [{ "id": "a1", "value": 1.0, "cost": 3.0, "kind": "meal", "shift_id": "imposter" }],
            "award_interpretations": [{ "id": "w1", "date": "2023-12-01", "units": 2.0, "cost": 4.0, "rule": "overtime" }]
        }]});

        let records = transform_page(&body)?;
        let allowance = serde_json::to_value(&records.allowances[0])?;
        assert_eq!(allowance["kind"], "meal");
        assert_eq!(allowance["shift_id"], "s1", "the parent id beats an upstream imposter");
        assert_eq!(serde_json::to_value(&records.award_interpretations[0])?["rule"], "overtime");
        Ok(())
    }

    #[test]
    fn the_one_where_bad_timestamps_quietly_become_null() -> anyhow::Result<()> {
        let body = json!({ "results": [{
            "id": "s1", "date": "2023-12-01", "start": 0, "finish": "tomorrow-ish",
            "breaks": [{ "id": "b1", "start": -5, "paid": false }],
            "allowances": [], "award_interpretations": []
        }]});

        let records = transform_page(&body)?;
        assert_eq!(records.shifts[0].shift_start, None);
        assert_eq!(records.shifts[0].shift_finish, None);
        assert_eq!(records.breaks[0].break_start, None);
        assert_eq!(records.breaks[0].break_finish, None);
        Ok(())
    }

    #[test]
    fn the_one_where_the_page_forgot_its_results() {
        let outcome = transform_page(&json!({ "links": {} }));
        assert!(matches!(outcome, Err(EtlError::StructuralFormat(_))), "{outcome:?}");
    }

    #[test]
    fn the_one_where_a_shift_without_an_id_sinks_the_whole_page() {
        let mut page = the_two_shift_page();
        page["results"][1]
            .as_object_mut()
            .expect("💀 fixture shift is an object")
            .remove("id");

        let outcome = transform_page(&page);
        assert!(matches!(outcome, Err(EtlError::StructuralFormat(_))), "{outcome:?}");
    }

    #[test]
    fn the_one_where_a_nested_list_goes_missing() {
        let mut page = the_two_shift_page();
        page["results"][0]
            .as_object_mut()
            .expect("💀 fixture shift is an object")
            .remove("breaks");

        assert!(matches!(transform_page(&page), Err(EtlError::StructuralFormat(_))));
    }

    #[test]
    fn the_one_where_an_allowance_has_no_cost() {
        let mut page = the_two_shift_page();
        page["results"][0]["allowances"][2]
            .as_object_mut()
            .expect("💀 fixture allowance is an object")
            .remove("cost");

        assert!(matches!(transform_page(&page), Err(EtlError::StructuralFormat(_))));
    }

    #[test]
    fn the_one_where_numeric_ids_are_still_ids() -> anyhow::Result<()> {
        let mut page = the_two_shift_page();
        page["results"][0]["id"] = json!(1);
        page["results"][0]["breaks"][0]["id"] = json!(10);
        page["results"][0]["allowances"][0]["id"] = json!(100);
        page["results"][1]["award_interpretations"][0]["id"] = json!(1000);

        let records = transform_page(&page)?;

        assert_eq!(records.shifts[0].shift_id, "1");
        assert_eq!(records.breaks[0].break_id, "10");
        assert_eq!(records.breaks[0].shift_id, "1");
        assert_eq!(records.allowances[0].allowance_id, "100");
        assert_eq!(records.allowances[0].shift_id, "1");
        assert_eq!(records.award_interpretations[0].award_id, "1000");
        Ok(())
    }

    #[test]
    fn the_one_where_an_id_is_neither_text_nor_a_whole_number() {
        let mut page = the_two_shift_page();
        page["results"][0]["id"] = json!({ "uuid": "nope" });

        assert!(matches!(transform_page(&page), Err(EtlError::StructuralFormat(_))));
    }
}
