//! Terminal formatting for batch reports and the series catalog.
//!
//! Kept apart from the loading code so output changes stay local.

use crate::data::Catalog;
use crate::report::BatchReport;
use crate::warehouse::MemoryWarehouse;

/// Render the per-series outcome table for a batch.
pub fn format_batch_report(report: &BatchReport) -> String {
    let mut out = String::new();

    let loaded = report.succeeded().count();
    let failed = report.outcomes.len() - loaded;

    out.push_str("=== fred-etl - FRED series load ===\n");
    out.push_str(&format!("Range: {} .. {}\n", report.range.start, report.range.end));
    out.push_str(&format!(
        "Series: {} selected, {loaded} loaded, {failed} failed\n",
        report.outcomes.len()
    ));
    out.push_str(&format!("Facts appended: {}\n\n", report.total_facts_appended()));

    for outcome in &report.outcomes {
        let id = outcome.identifier();
        match &outcome.result {
            Ok(load) => {
                out.push_str(&format!(
                    "OK    {:<18} obs={:>6}  dates+={:>6}  facts+={:>6}  dropped={}",
                    id, load.observations, load.dates_added, load.facts_appended, load.facts_dropped
                ));
                if load.series_registered {
                    out.push_str("  (new series)");
                }
                out.push('\n');
            }
            Err(err) => {
                out.push_str(&format!("FAIL  {id:<18} {err}\n"));
            }
        }
    }

    out
}

/// Render the catalog as `id  label` lines.
pub fn format_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    for entry in catalog.entries() {
        out.push_str(&format!("{:<18} {}\n", entry.series_id, entry.label));
    }
    out
}

/// Summarize what a dry run would have written.
pub fn format_dry_run_summary(warehouse: &MemoryWarehouse) -> String {
    format!(
        "Dry run (nothing written): {} date_dim rows, {} series_dim rows, {} series_fact rows.\n",
        warehouse.dates().len(),
        warehouse.series().len(),
        warehouse.facts().len()
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::DateRange;
    use crate::error::{EtlError, UpstreamError};
    use crate::report::{SeriesLoad, SeriesOutcome};

    fn sample_report() -> BatchReport {
        BatchReport {
            range: DateRange {
                start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
            },
            outcomes: vec![
                SeriesOutcome {
                    selection: "Gross Domestic Product".into(),
                    series_id: Some("GDP".into()),
                    result: Ok(SeriesLoad {
                        observations: 4,
                        dates_added: 4,
                        series_registered: true,
                        facts_appended: 4,
                        facts_dropped: 0,
                    }),
                },
                SeriesOutcome {
                    selection: "Housing Starts".into(),
                    series_id: Some("HOUST".into()),
                    result: Err(EtlError::Upstream(UpstreamError::Status {
                        status: 500,
                        body: "Internal Server Error".into(),
                    })),
                },
                SeriesOutcome {
                    selection: "Bitcoin".into(),
                    series_id: None,
                    result: Err(EtlError::UnknownSeries("Bitcoin".into())),
                },
            ],
        }
    }

    #[test]
    fn batch_report_lists_every_series() {
        let text = format_batch_report(&sample_report());
        assert!(text.contains("3 selected, 1 loaded, 2 failed"));
        assert!(text.contains("Facts appended: 4"));
        assert!(text.contains("OK    GDP"));
        assert!(text.contains("(new series)"));
        assert!(text.contains("FAIL  HOUST"));
        assert!(text.contains("FRED API error: 500 - Internal Server Error"));
        assert!(text.contains("FAIL  Bitcoin"));
    }

    #[test]
    fn catalog_lists_ids_and_labels() {
        let text = format_catalog(Catalog::builtin());
        assert_eq!(text.lines().count(), 9);
        assert!(text.lines().next().unwrap().starts_with("UNRATE"));
        assert!(text.contains("S&P 500 Index"));
    }
}
