// AI
//! 📊 progress.rs - "Are we there yet?" - every pipeline, every time, forever.
//!
//! 🚀 Paginated APIs don't tell you how many pages there are. So no progress bar, no ETA, no
//! percentage. Just a spinner, the page we're on, and how many rows have landed so far.
//! Honest about what it knows, which is more than most dashboards.
//!
//! ⚠️  Warning: Watching this spinner will not make the API respond faster.
//!
//! 🦆 The duck has nothing to do with this module. It's just vibing.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;

use crate::common::{PageWriteReport, RunSummary};

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} [{elapsed_precise}] {msg}";

/// 🔢 Formats a number with commas for the 3 people in the audience who like readability.
/// "1000000 rows" → "1,000,000 rows" - you're welcome, eyes.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    // -- 🧵 pre-allocate like we know what we're doing (we do, we read the book)
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

fn format_totals(totals: &PageWriteReport) -> String {
    format!(
        "{} shifts · {} breaks · {} allowances · {} awards",
        format_number(totals.shifts),
        format_number(totals.breaks),
        format_number(totals.allowances),
        format_number(totals.award_interpretations),
    )
}

/// 📊 The spinner that keeps the operator company during a run.
///
/// indicatif draws to stderr and hides itself when stderr is not a terminal, so piping the
/// output somewhere sensible gets you logs and no spinner soup.
pub(crate) struct RunProgress {
    spinner: ProgressBar,
}

impl RunProgress {
    /// 🚀 A live spinner, ticking on its own.
    pub(crate) fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        // -- 🐛 the template is a constant, but we still don't unwrap. fall back to the plain spinner.
        spinner.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self { spinner }
    }

    /// 🙈 A spinner nobody will ever see. For tests and other quiet places.
    #[cfg(test)]
    pub(crate) fn hidden() -> Self {
        Self {
            spinner: ProgressBar::hidden(),
        }
    }

    pub(crate) fn fetching(&self, page_number: usize, url: &Url) {
        self.spinner.set_message(format!("📡 page {page_number}: {url}"));
    }

    pub(crate) fn page_committed(&self, pages: usize, totals: &PageWriteReport) {
        self.spinner.set_message(format!(
            "✅ {} pages committed: {}",
            format_number(pages),
            format_totals(totals)
        ));
    }

    pub(crate) fn aggregating(&self) {
        self.spinner.set_message("📊 computing KPIs");
    }

    /// 🏁 Leave one last line behind. The summary table takes it from here.
    pub(crate) fn finish(&self, summary: &RunSummary) {
        self.spinner
            .finish_with_message(format!("🏁 done after {} pages", format_number(summary.pages)));
    }

    /// 💀 Freeze the spinner where it died, with the reason next to it.
    pub(crate) fn abandon(&self, reason: &str) {
        self.spinner.abandon_with_message(format!("💀 {reason}"));
    }
}
