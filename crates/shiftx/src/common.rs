// ai
//! 📦 Common data structures - the row-shaped building blocks of shiftx
//!
//! ---
//!
//! 🎬 COLD OPEN - INT. ROSTERING OFFICE - 5:58 AM
//!
//! The API hands over a shift. Inside the shift: breaks. Inside the shift: allowances.
//! Inside the shift: award interpretations, which is payroll for "we read the enterprise
//! agreement so you don't have to". Nested like a matryoshka doll that files timesheets.
//!
//! A relational database looks at this and says "absolutely not". So we flatten.
//!
//! 🦆
//!
//! This module defines the flattened rows (one struct per table), the page-scoped bundle that
//! carries them from the transformer to the writer ([`PageRecords`]), and the KPI vocabulary.
//! A `PageRecords` lives exactly as long as one page. Nothing here outlives its page. That's
//! the whole point: no accumulator fields quietly carrying last page's breaks into this one.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};

/// 🗓️ One row of `shifts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftRow {
    pub shift_id: String,
    pub shift_date: NaiveDate,
    /// `None` when upstream sent nothing usable (absent, zero, negative, not an integer).
    pub shift_start: Option<NaiveDateTime>,
    pub shift_finish: Option<NaiveDateTime>,
    /// Σ allowance costs + Σ award costs, rounded to 4 decimals.
    pub shift_cost: f64,
}

/// ☕ One row of `breaks`. `break_id` must be unique across the whole store, not just the shift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakRow {
    pub break_id: String,
    pub shift_id: String,
    pub break_start: Option<NaiveDateTime>,
    pub break_finish: Option<NaiveDateTime>,
    pub is_paid: bool,
}

/// 💰 One row of `allowances`.
///
/// Upstream keys we don't map ride along in `passthrough`, untouched. They show up in the
/// serialized row but never in the table, which has fixed columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllowanceRow {
    pub allowance_id: String,
    pub shift_id: String,
    pub allowance_value: f64,
    pub allowance_cost: f64,
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

/// 📜 One row of `award_interpretations`. Same pass-through deal as [`AllowanceRow`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardInterpretationRow {
    pub award_id: String,
    pub shift_id: String,
    pub award_date: NaiveDate,
    pub award_units: f64,
    pub award_cost: f64,
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

/// 📦 Everything one page turns into. Four independent record sets, each row pointing back at
/// its parent shift.
///
/// Built by `transforms::transform_page`, consumed (moved, not borrowed) by the page writer,
/// then gone. Page-scoped. Short-lived. Like a mayfly, but with foreign keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageRecords {
    pub shifts: Vec<ShiftRow>,
    pub breaks: Vec<BreakRow>,
    pub allowances: Vec<AllowanceRow>,
    pub award_interpretations: Vec<AwardInterpretationRow>,
}

impl PageRecords {
    /// 📊 How many rows this page would put into each table, in write order.
    pub fn row_counts(&self) -> PageWriteReport {
        PageWriteReport {
            shifts: self.shifts.len(),
            breaks: self.breaks.len(),
            allowances: self.allowances.len(),
            award_interpretations: self.award_interpretations.len(),
        }
    }
}

/// ✅ Per-table inserted-row counts for one committed page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageWriteReport {
    pub shifts: usize,
    pub breaks: usize,
    pub allowances: usize,
    pub award_interpretations: usize,
}

impl std::ops::AddAssign for PageWriteReport {
    fn add_assign(&mut self, page: PageWriteReport) {
        self.shifts += page.shifts;
        self.breaks += page.breaks;
        self.allowances += page.allowances;
        self.award_interpretations += page.award_interpretations;
    }
}

/// 🏷️ The six KPI names. Closed set. Adding a seventh means touching the aggregator too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiName {
    MeanBreakLengthInMinutes,
    MeanShiftCost,
    MaxAllowanceCost14d,
    MaxBreakFreeShiftPeriodInDays,
    MinShiftLengthInHours,
    TotalNumberOfPaidBreaks,
}

impl KpiName {
    /// Insert order of the KPI batch.
    pub const ALL: [KpiName; 6] = [
        KpiName::MeanBreakLengthInMinutes,
        KpiName::MeanShiftCost,
        KpiName::MaxAllowanceCost14d,
        KpiName::MaxBreakFreeShiftPeriodInDays,
        KpiName::MinShiftLengthInHours,
        KpiName::TotalNumberOfPaidBreaks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KpiName::MeanBreakLengthInMinutes => "mean_break_length_in_minutes",
            KpiName::MeanShiftCost => "mean_shift_cost",
            KpiName::MaxAllowanceCost14d => "max_allowance_cost_14d",
            KpiName::MaxBreakFreeShiftPeriodInDays => "max_break_free_shift_period_in_days",
            KpiName::MinShiftLengthInHours => "min_shift_length_in_hours",
            KpiName::TotalNumberOfPaidBreaks => "total_number_of_paid_breaks",
        }
    }
}

impl std::fmt::Display for KpiName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 📊 The six values one aggregation inserted, plus the date they were filed under.
///
/// Missing data is `0.0`, never absent. The aggregator guarantees it, this struct just holds it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiSnapshot {
    pub kpi_date: NaiveDate,
    pub mean_break_length_in_minutes: f64,
    pub mean_shift_cost: f64,
    pub max_allowance_cost_14d: f64,
    pub max_break_free_shift_period_in_days: f64,
    pub min_shift_length_in_hours: f64,
    pub total_number_of_paid_breaks: f64,
}

impl KpiSnapshot {
    pub fn value(&self, name: KpiName) -> f64 {
        match name {
            KpiName::MeanBreakLengthInMinutes => self.mean_break_length_in_minutes,
            KpiName::MeanShiftCost => self.mean_shift_cost,
            KpiName::MaxAllowanceCost14d => self.max_allowance_cost_14d,
            KpiName::MaxBreakFreeShiftPeriodInDays => self.max_break_free_shift_period_in_days,
            KpiName::MinShiftLengthInHours => self.min_shift_length_in_hours,
            KpiName::TotalNumberOfPaidBreaks => self.total_number_of_paid_breaks,
        }
    }

    /// 🔄 `(name, value)` pairs in insert order.
    pub fn entries(&self) -> impl Iterator<Item = (KpiName, f64)> + '_ {
        KpiName::ALL.into_iter().map(|name| (name, self.value(name)))
    }
}

/// 🏁 What a successful run hands back to whoever pulled the trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub pages: usize,
    pub shifts: usize,
    pub breaks: usize,
    pub allowances: usize,
    pub award_interpretations: usize,
    pub kpis: KpiSnapshot,
}

/// 🔢 Round half away from zero to `decimals` places. `f64::round` does the heavy lifting.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
