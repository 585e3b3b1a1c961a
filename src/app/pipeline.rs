//! Shared batch pipeline used by the CLI (and anything else that embeds the crate).
//!
//! Per selected series, in order:
//! catalog resolve -> FRED fetch -> date_dim -> series_dim -> series_fact
//!
//! A failing series is recorded in the report and the batch moves on to the next one.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::data::{Catalog, ObservationSource, SeriesEntry};
use crate::domain::DateRange;
use crate::error::EtlError;
use crate::load::{ensure_dates, ensure_series, load_facts};
use crate::report::{BatchReport, SeriesLoad, SeriesOutcome};
use crate::warehouse::Warehouse;

/// What the caller asked for, before validation.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    /// Catalog labels (or series ids).
    pub selections: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    selections: Vec<String>,
    range: DateRange,
}

impl BatchPlan {
    pub fn selections(&self) -> &[String] {
        &self.selections
    }

    pub fn range(&self) -> DateRange {
        self.range
    }
}

/// Check the request without touching the network or the store.
///
/// Repeated selections are collapsed; the first occurrence keeps its position.
pub fn validate(request: &BatchRequest) -> Result<BatchPlan, EtlError> {
    let mut seen = HashSet::new();
    let selections: Vec<String> = request
        .selections
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect();

    if selections.is_empty() {
        return Err(EtlError::Validation("Please select at least one series.".into()));
    }
    let (Some(start), Some(end)) = (request.start, request.end) else {
        return Err(EtlError::Validation("Please select both start and end dates.".into()));
    };
    if start > end {
        return Err(EtlError::Validation(format!(
            "Start date must be before end date (got {start} > {end})."
        )));
    }

    Ok(BatchPlan {
        selections,
        range: DateRange { start, end },
    })
}

/// Validate `request`, then load every selected series.
pub fn run<S, W>(
    request: &BatchRequest,
    catalog: &Catalog,
    source: &S,
    warehouse: &mut W,
) -> Result<BatchReport, EtlError>
where
    S: ObservationSource,
    W: Warehouse,
{
    let plan = validate(request)?;
    Ok(run_plan(&plan, catalog, source, warehouse))
}

/// Load every series in a validated plan. Never fails as a whole.
pub fn run_plan<S, W>(plan: &BatchPlan, catalog: &Catalog, source: &S, warehouse: &mut W) -> BatchReport
where
    S: ObservationSource,
    W: Warehouse,
{
    info!(
        series = plan.selections.len(),
        start = %plan.range.start,
        end = %plan.range.end,
        "starting batch"
    );

    let mut outcomes = Vec::with_capacity(plan.selections.len());
    for selection in &plan.selections {
        let outcome = match catalog.resolve(selection) {
            Ok(entry) => SeriesOutcome {
                selection: selection.clone(),
                series_id: Some(entry.series_id.to_string()),
                result: load_series(source, warehouse, entry, plan.range),
            },
            Err(err) => SeriesOutcome {
                selection: selection.clone(),
                series_id: None,
                result: Err(err),
            },
        };

        match &outcome.result {
            Ok(load) => info!(
                series_id = outcome.identifier(),
                observations = load.observations,
                dates_added = load.dates_added,
                facts_appended = load.facts_appended,
                "series loaded"
            ),
            Err(err) => warn!(series_id = outcome.identifier(), error = %err, "series failed"),
        }
        outcomes.push(outcome);
    }

    let report = BatchReport {
        range: plan.range,
        outcomes,
    };
    info!(
        loaded = report.succeeded().count(),
        failed = report.failed().count(),
        "batch finished"
    );
    report
}

/// Fetch one series and push it through the three load stages.
///
/// Each stage commits on its own; a failure in a later stage keeps what the
/// earlier ones wrote.
pub fn load_series<S, W>(
    source: &S,
    warehouse: &mut W,
    entry: SeriesEntry,
    range: DateRange,
) -> Result<SeriesLoad, EtlError>
where
    S: ObservationSource,
    W: Warehouse,
{
    let observations = source.fetch(entry.series_id, range.start, range.end)?;
    let dates: BTreeSet<NaiveDate> = observations.iter().map(|o| o.date).collect();

    let date_load = ensure_dates(warehouse, &dates)?;
    let series_registered = ensure_series(warehouse, entry.series_id, entry.label)?;
    let facts = load_facts(warehouse, entry.series_id, &observations, &date_load.lookup)?;

    Ok(SeriesLoad {
        observations: observations.len(),
        dates_added: date_load.inserted,
        series_registered,
        facts_appended: facts.appended,
        facts_dropped: facts.dropped,
    })
}
