//! Fact loader.
//!
//! Facts are an append log: there is no key on `(date_id, series_id)`, so loading
//! an overlapping range twice stores the overlapping values twice.

use tracing::{debug, warn};

use crate::domain::{DateLookup, NewFact, Observation};
use crate::error::StoreError;
use crate::warehouse::Warehouse;

/// Result of [`load_facts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactLoad {
    pub appended: u64,
    /// Observations skipped because their date had no `date_dim` id.
    pub dropped: usize,
}

/// Append one fact row per observation whose date resolves through `lookup`.
pub fn load_facts<W: Warehouse>(
    warehouse: &mut W,
    series_id: &str,
    observations: &[Observation],
    lookup: &DateLookup,
) -> Result<FactLoad, StoreError> {
    let (rows, dropped) = resolve_facts(series_id, observations, lookup);
    if dropped > 0 {
        warn!(series_id, dropped, "observations without a date_dim id were skipped");
    }

    let appended = warehouse.transaction(|tx| {
        tx.create_series_fact()?;
        tx.append_facts(&rows)
    })?;
    debug!(series_id, appended, "facts appended");

    Ok(FactLoad { appended, dropped })
}

/// Pair observations with their date ids. Returns the rows and how many were dropped.
pub fn resolve_facts(series_id: &str, observations: &[Observation], lookup: &DateLookup) -> (Vec<NewFact>, usize) {
    let rows: Vec<NewFact> = observations
        .iter()
        .filter_map(|obs| {
            lookup.get(&obs.date).map(|date_id| NewFact {
                date_id,
                series_id: series_id.to_string(),
                value: obs.value,
            })
        })
        .collect();
    let dropped = observations.len() - rows.len();
    (rows, dropped)
}
