//! Date dimension manager.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DateLookup, DateParts};
use crate::error::StoreError;
use crate::warehouse::Warehouse;

/// Result of [`ensure_dates`].
#[derive(Debug, Clone, Default)]
pub struct DateLoad {
    /// `full_date -> date_id` for every requested date.
    pub lookup: DateLookup,
    /// Rows this call added to `date_dim`.
    pub inserted: u64,
}

/// Make sure every date in `dates` has exactly one `date_dim` row and return their ids.
///
/// Runs as one transaction: create table, read which dates are already stored,
/// insert the rest, read back ids. The insert skips conflicting `full_date`s, so
/// a concurrent loader adding the same date cannot produce a duplicate row.
pub fn ensure_dates<W: Warehouse>(warehouse: &mut W, dates: &BTreeSet<NaiveDate>) -> Result<DateLoad, StoreError> {
    warehouse.transaction(|tx| {
        tx.create_date_dim()?;
        if dates.is_empty() {
            return Ok(DateLoad::default());
        }

        let stored = tx.stored_dates(dates)?;
        let rows: Vec<DateParts> = new_dates(dates, &stored)
            .into_iter()
            .map(DateParts::from_date)
            .collect();
        let inserted = tx.insert_dates(&rows)?;
        let lookup = tx.date_ids(dates)?;

        debug!(
            requested = dates.len(),
            already_stored = stored.len(),
            inserted,
            "date dimension updated"
        );
        Ok(DateLoad { lookup, inserted })
    })
}

/// Requested dates that are not stored yet, in calendar order.
pub fn new_dates(requested: &BTreeSet<NaiveDate>, stored: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    requested.iter().filter(|d| !stored.contains(d)).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::{MemoryWarehouse, Statement};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dates(list: &[NaiveDate]) -> BTreeSet<NaiveDate> {
        list.iter().copied().collect()
    }

    #[test]
    fn new_dates_is_a_set_difference() {
        let requested = dates(&[date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]);
        let stored: HashSet<NaiveDate> = [date(2024, 2, 1), date(2023, 12, 1)].into_iter().collect();
        assert_eq!(new_dates(&requested, &stored), vec![date(2024, 1, 1), date(2024, 3, 1)]);
    }

    #[test]
    fn inserts_each_date_once_with_derived_parts() {
        let mut wh = MemoryWarehouse::new();
        let load = ensure_dates(&mut wh, &dates(&[date(2024, 3, 15), date(2024, 11, 2)])).unwrap();

        assert_eq!(load.inserted, 2);
        assert_eq!(load.lookup.len(), 2);
        let row = wh
            .dates()
            .iter()
            .find(|r| r.parts.full_date == date(2024, 3, 15))
            .unwrap();
        assert_eq!((row.parts.year, row.parts.quarter, row.parts.month, row.parts.day), (2024, 1, 3, 15));
        assert_eq!(load.lookup.get(&date(2024, 3, 15)), Some(row.date_id));
    }

    #[test]
    fn repeated_calls_are_idempotent_and_ids_stable() {
        let mut wh = MemoryWarehouse::new();
        let set = dates(&[date(2020, 1, 1), date(2020, 4, 1)]);

        let first = ensure_dates(&mut wh, &set).unwrap();
        let second = ensure_dates(&mut wh, &set).unwrap();

        assert_eq!(wh.dates().len(), 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(first.lookup, second.lookup);
    }

    #[test]
    fn overlapping_sets_only_add_new_dates() {
        let mut wh = MemoryWarehouse::new();
        let first = ensure_dates(&mut wh, &dates(&[date(2020, 1, 1), date(2020, 2, 1)])).unwrap();
        let second = ensure_dates(&mut wh, &dates(&[date(2020, 2, 1), date(2020, 3, 1)])).unwrap();

        assert_eq!(second.inserted, 1);
        assert_eq!(wh.dates().len(), 3);
        assert_eq!(
            first.lookup.get(&date(2020, 2, 1)),
            second.lookup.get(&date(2020, 2, 1))
        );
        // Only the requested dates come back.
        assert_eq!(second.lookup.get(&date(2020, 1, 1)), None);
    }

    #[test]
    fn empty_set_still_creates_table() {
        let mut wh = MemoryWarehouse::new();
        let load = ensure_dates(&mut wh, &BTreeSet::new()).unwrap();
        assert!(load.lookup.is_empty());
        assert_eq!(wh.statement_count(), 1);
    }

    #[test]
    fn insert_failure_leaves_dimension_untouched() {
        let mut wh = MemoryWarehouse::new();
        wh.fail_on(Statement::DateIds);
        let err = ensure_dates(&mut wh, &dates(&[date(2021, 6, 30)])).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(wh.dates().is_empty());
    }
}
