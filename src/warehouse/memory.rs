//! In-process warehouse with the same observable behavior as the Postgres schema:
//! store-assigned ids, unique `full_date` / `series_id`, foreign-key checks and
//! all-or-nothing transactions.
//!
//! Used by `load --dry-run` and by the test suite, which can also make individual
//! statements fail and count how many statements were issued.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::domain::{DateDimRow, DateLookup, DateParts, FactRow, NewFact, SeriesDimRow};
use crate::error::StoreError;
use crate::warehouse::{Warehouse, WarehouseTx};

const DATE_DIM: &str = "public.date_dim";
const SERIES_DIM: &str = "fed.series_dim";
const SERIES_FACT: &str = "fed.series_fact";

/// Statements a [`MemoryWarehouse`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    CreateDateDim,
    StoredDates,
    InsertDates,
    DateIds,
    CreateSeriesDim,
    InsertSeries,
    CreateSeriesFact,
    AppendFacts,
}

impl Statement {
    fn name(self) -> &'static str {
        match self {
            Statement::CreateDateDim => "create date_dim",
            Statement::StoredDates => "read stored dates",
            Statement::InsertDates => "insert dates",
            Statement::DateIds => "read date ids",
            Statement::CreateSeriesDim => "create series_dim",
            Statement::InsertSeries => "insert series",
            Statement::CreateSeriesFact => "create series_fact",
            Statement::AppendFacts => "append facts",
        }
    }
}

/// `None` means the table has not been created yet.
#[derive(Debug, Clone, Default)]
struct Tables {
    date_dim: Option<Vec<DateDimRow>>,
    series_dim: Option<Vec<SeriesDimRow>>,
    series_fact: Option<Vec<FactRow>>,
    last_date_id: i32,
    last_fact_id: i32,
}

#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    tables: Tables,
    failing: HashSet<Statement>,
    statements: usize,
    transactions: usize,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later execution of `statement` fail.
    pub fn fail_on(&mut self, statement: Statement) {
        self.failing.insert(statement);
    }

    pub fn dates(&self) -> &[DateDimRow] {
        self.tables.date_dim.as_deref().unwrap_or_default()
    }

    pub fn series(&self) -> &[SeriesDimRow] {
        self.tables.series_dim.as_deref().unwrap_or_default()
    }

    pub fn facts(&self) -> &[FactRow] {
        self.tables.series_fact.as_deref().unwrap_or_default()
    }

    /// Statements issued so far, including those in rolled-back transactions.
    pub fn statement_count(&self) -> usize {
        self.statements
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions
    }
}

impl Warehouse for MemoryWarehouse {
    fn transaction<T, F>(&mut self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn WarehouseTx) -> Result<T, StoreError>,
    {
        self.transactions += 1;
        let mut working = self.tables.clone();
        let mut tx = MemoryTx {
            tables: &mut working,
            failing: &self.failing,
            statements: &mut self.statements,
        };
        let result = work(&mut tx);
        if result.is_ok() {
            self.tables = working;
        }
        result
    }
}

struct MemoryTx<'a> {
    tables: &'a mut Tables,
    failing: &'a HashSet<Statement>,
    statements: &'a mut usize,
}

impl MemoryTx<'_> {
    fn issue(&mut self, statement: Statement) -> Result<(), StoreError> {
        *self.statements += 1;
        if self.failing.contains(&statement) {
            return Err(StoreError::Unavailable(statement.name()));
        }
        Ok(())
    }
}

fn table<'t, R>(rows: &'t Option<Vec<R>>, name: &'static str) -> Result<&'t Vec<R>, StoreError> {
    rows.as_ref().ok_or(StoreError::MissingTable(name))
}

fn table_mut<'t, R>(rows: &'t mut Option<Vec<R>>, name: &'static str) -> Result<&'t mut Vec<R>, StoreError> {
    rows.as_mut().ok_or(StoreError::MissingTable(name))
}

impl WarehouseTx for MemoryTx<'_> {
    fn create_date_dim(&mut self) -> Result<(), StoreError> {
        self.issue(Statement::CreateDateDim)?;
        self.tables.date_dim.get_or_insert_with(Vec::new);
        Ok(())
    }

    fn stored_dates(&mut self, candidates: &BTreeSet<NaiveDate>) -> Result<HashSet<NaiveDate>, StoreError> {
        self.issue(Statement::StoredDates)?;
        let rows = table(&self.tables.date_dim, DATE_DIM)?;
        Ok(rows
            .iter()
            .map(|r| r.parts.full_date)
            .filter(|d| candidates.contains(d))
            .collect())
    }

    fn insert_dates(&mut self, rows: &[DateParts]) -> Result<u64, StoreError> {
        self.issue(Statement::InsertDates)?;
        let stored = table_mut(&mut self.tables.date_dim, DATE_DIM)?;
        let mut inserted = 0;
        for parts in rows {
            if stored.iter().any(|r| r.parts.full_date == parts.full_date) {
                continue;
            }
            self.tables.last_date_id += 1;
            stored.push(DateDimRow {
                date_id: self.tables.last_date_id,
                parts: *parts,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    fn date_ids(&mut self, dates: &BTreeSet<NaiveDate>) -> Result<DateLookup, StoreError> {
        self.issue(Statement::DateIds)?;
        let rows = table(&self.tables.date_dim, DATE_DIM)?;
        Ok(rows
            .iter()
            .filter(|r| dates.contains(&r.parts.full_date))
            .map(|r| (r.parts.full_date, r.date_id))
            .collect())
    }

    fn create_series_dim(&mut self) -> Result<(), StoreError> {
        self.issue(Statement::CreateSeriesDim)?;
        self.tables.series_dim.get_or_insert_with(Vec::new);
        Ok(())
    }

    fn insert_series(&mut self, row: &SeriesDimRow) -> Result<bool, StoreError> {
        self.issue(Statement::InsertSeries)?;
        let stored = table_mut(&mut self.tables.series_dim, SERIES_DIM)?;
        if stored.iter().any(|r| r.series_id == row.series_id) {
            return Ok(false);
        }
        stored.push(row.clone());
        Ok(true)
    }

    fn create_series_fact(&mut self) -> Result<(), StoreError> {
        self.issue(Statement::CreateSeriesFact)?;
        // REFERENCES needs both dimension tables in place.
        table(&self.tables.date_dim, DATE_DIM)?;
        table(&self.tables.series_dim, SERIES_DIM)?;
        self.tables.series_fact.get_or_insert_with(Vec::new);
        Ok(())
    }

    fn append_facts(&mut self, rows: &[NewFact]) -> Result<u64, StoreError> {
        self.issue(Statement::AppendFacts)?;
        table(&self.tables.series_fact, SERIES_FACT)?;

        let dates = table(&self.tables.date_dim, DATE_DIM)?;
        let series = table(&self.tables.series_dim, SERIES_DIM)?;
        for fact in rows {
            if !dates.iter().any(|r| r.date_id == fact.date_id) {
                return Err(StoreError::Constraint(format!(
                    "series_fact.date_id {} is not present in {DATE_DIM}",
                    fact.date_id
                )));
            }
            if !series.iter().any(|r| r.series_id == fact.series_id) {
                return Err(StoreError::Constraint(format!(
                    "series_fact.series_id {} is not present in {SERIES_DIM}",
                    fact.series_id
                )));
            }
        }

        let facts = table_mut(&mut self.tables.series_fact, SERIES_FACT)?;
        for fact in rows {
            self.tables.last_fact_id += 1;
            facts.push(FactRow {
                fact_id: self.tables.last_fact_id,
                date_id: fact.date_id,
                series_id: fact.series_id.clone(),
                value: fact.value,
            });
        }
        Ok(rows.len() as u64)
    }
}
