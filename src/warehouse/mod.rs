//! Warehouse access for the star schema.
//!
//! The load logic never talks to a driver directly. It asks a [`Warehouse`] for a
//! transaction and issues the handful of statements it needs through
//! [`WarehouseTx`]:
//!
//! - `public.date_dim`   (date dimension, `date_id` surrogate)
//! - `fed.series_dim`    (series dimension, keyed by provider id)
//! - `fed.series_fact`   (append-only values)
//!
//! Two backends exist: [`PgWarehouse`] for PostgreSQL and [`MemoryWarehouse`], an
//! in-process store with the same observable semantics used for dry runs and tests.
//!
//! Concurrency: each group of statements runs in its own transaction, but
//! nothing serializes two processes loading at the same time. The dimension
//! inserts rely on the `full_date`/`series_id` unique keys (`ON CONFLICT DO
//! NOTHING`) to stay one-row-per-key under that race. Facts have no such key.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::domain::{DateLookup, DateParts, NewFact, SeriesDimRow};
use crate::error::StoreError;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryWarehouse, Statement};
pub use postgres::PgWarehouse;

/// A store that can run a group of statements atomically.
pub trait Warehouse {
    /// Run `work` in one transaction: committed if it returns `Ok`, rolled back otherwise.
    fn transaction<T, F>(&mut self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn WarehouseTx) -> Result<T, StoreError>;
}

/// Statements available inside a transaction.
pub trait WarehouseTx {
    /// `CREATE TABLE IF NOT EXISTS public.date_dim`.
    fn create_date_dim(&mut self) -> Result<(), StoreError>;

    /// Which of `candidates` already have a `date_dim` row.
    fn stored_dates(&mut self, candidates: &BTreeSet<NaiveDate>) -> Result<HashSet<NaiveDate>, StoreError>;

    /// Insert date rows, skipping any `full_date` that already exists. Returns rows inserted.
    fn insert_dates(&mut self, rows: &[DateParts]) -> Result<u64, StoreError>;

    /// `full_date -> date_id` for the requested dates that exist.
    fn date_ids(&mut self, dates: &BTreeSet<NaiveDate>) -> Result<DateLookup, StoreError>;

    /// `CREATE TABLE IF NOT EXISTS fed.series_dim` (and the `fed` schema).
    fn create_series_dim(&mut self) -> Result<(), StoreError>;

    /// Register a series unless its id is already present. Returns `true` if inserted.
    fn insert_series(&mut self, row: &SeriesDimRow) -> Result<bool, StoreError>;

    /// `CREATE TABLE IF NOT EXISTS fed.series_fact` with its foreign keys.
    fn create_series_fact(&mut self) -> Result<(), StoreError>;

    /// Append fact rows. Returns rows inserted.
    fn append_facts(&mut self, rows: &[NewFact]) -> Result<u64, StoreError>;
}
