//! Shared domain types.
//!
//! These mirror the star schema one-to-one:
//!
//! - `DateParts` / `DateDimRow` for `public.date_dim`
//! - `SeriesDimRow` for `fed.series_dim`
//! - `NewFact` / `FactRow` for `fed.series_fact`

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

/// One usable data point for a series. Missing provider values never get this far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Inclusive observation window requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Calendar attributes stored for a `full_date` in the date dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateParts {
    pub full_date: NaiveDate,
    pub year: i32,
    pub quarter: i32,
    pub month: i32,
    pub day: i32,
}

impl DateParts {
    pub fn from_date(full_date: NaiveDate) -> Self {
        let month = full_date.month() as i32;
        Self {
            full_date,
            year: full_date.year(),
            quarter: (month - 1) / 3 + 1,
            month,
            day: full_date.day() as i32,
        }
    }
}

/// A stored date dimension row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateDimRow {
    pub date_id: i32,
    pub parts: DateParts,
}

/// A stored series dimension row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesDimRow {
    pub series_id: String,
    pub series_name: String,
}

/// A fact row ready to be appended (the store assigns `fact_id`).
#[derive(Debug, Clone, PartialEq)]
pub struct NewFact {
    pub date_id: i32,
    pub series_id: String,
    pub value: f64,
}

/// A stored fact row.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub fact_id: i32,
    pub date_id: i32,
    pub series_id: String,
    pub value: f64,
}

/// `full_date -> date_id` lookup read back from the date dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateLookup {
    ids: HashMap<NaiveDate, i32>,
}

impl DateLookup {
    pub fn get(&self, date: &NaiveDate) -> Option<i32> {
        self.ids.get(date).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<(NaiveDate, i32)> for DateLookup {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, i32)>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_parts_derive_calendar_fields() {
        let parts = DateParts::from_date(date(2024, 3, 15));
        assert_eq!(parts.year, 2024);
        assert_eq!(parts.quarter, 1);
        assert_eq!(parts.month, 3);
        assert_eq!(parts.day, 15);
    }

    #[test]
    fn quarter_boundaries() {
        assert_eq!(DateParts::from_date(date(2023, 1, 1)).quarter, 1);
        assert_eq!(DateParts::from_date(date(2023, 4, 1)).quarter, 2);
        assert_eq!(DateParts::from_date(date(2023, 6, 30)).quarter, 2);
        assert_eq!(DateParts::from_date(date(2023, 7, 1)).quarter, 3);
        assert_eq!(DateParts::from_date(date(2023, 12, 31)).quarter, 4);
    }

    #[test]
    fn lookup_collects_pairs() {
        let lookup: DateLookup = [(date(2020, 1, 1), 7), (date(2020, 2, 1), 9)].into_iter().collect();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(&date(2020, 2, 1)), Some(9));
        assert_eq!(lookup.get(&date(2020, 3, 1)), None);
    }
}
