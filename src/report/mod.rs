//! Batch outcomes and their terminal rendering.

use crate::domain::DateRange;
use crate::error::EtlError;

pub mod format;

pub use format::*;

/// What one successful series load did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesLoad {
    /// Observations with a usable value returned by the provider.
    pub observations: usize,
    pub dates_added: u64,
    /// `true` if this run created the `series_dim` row.
    pub series_registered: bool,
    pub facts_appended: u64,
    pub facts_dropped: usize,
}

/// Outcome for one selected series.
#[derive(Debug)]
pub struct SeriesOutcome {
    /// The selection as given (label or id).
    pub selection: String,
    /// Provider id, when the selection resolved.
    pub series_id: Option<String>,
    pub result: Result<SeriesLoad, EtlError>,
}

impl SeriesOutcome {
    /// Identifier to report against: the series id if known, else the raw selection.
    pub fn identifier(&self) -> &str {
        self.series_id.as_deref().unwrap_or(&self.selection)
    }
}

/// Per-series results for one batch, in selection order.
#[derive(Debug)]
pub struct BatchReport {
    pub range: DateRange,
    pub outcomes: Vec<SeriesOutcome>,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &SeriesOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &SeriesOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn total_facts_appended(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|l| l.facts_appended)
            .sum()
    }
}
