//! PostgreSQL backend.
//!
//! sqlx is async; this adapter keeps a private current-thread runtime and blocks
//! on every statement so callers see a plain synchronous API. The pool holds a
//! single connection: one batch, one series, one statement at a time.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::domain::{DateLookup, DateParts, NewFact, SeriesDimRow};
use crate::error::StoreError;
use crate::warehouse::{Warehouse, WarehouseTx};

const CREATE_DATE_DIM: &str = "
    CREATE TABLE IF NOT EXISTS public.date_dim (
        date_id SERIAL PRIMARY KEY,
        full_date DATE UNIQUE,
        year INT,
        quarter INT,
        month INT,
        day INT
    )";

const CREATE_FED_SCHEMA: &str = "CREATE SCHEMA IF NOT EXISTS fed";

const CREATE_SERIES_DIM: &str = "
    CREATE TABLE IF NOT EXISTS fed.series_dim (
        series_id TEXT PRIMARY KEY,
        series_name TEXT
    )";

const CREATE_SERIES_FACT: &str = "
    CREATE TABLE IF NOT EXISTS fed.series_fact (
        fact_id SERIAL PRIMARY KEY,
        date_id INT REFERENCES public.date_dim(date_id),
        series_id TEXT REFERENCES fed.series_dim(series_id),
        value NUMERIC
    )";

const SELECT_STORED_DATES: &str = "SELECT full_date FROM public.date_dim WHERE full_date = ANY($1)";

const INSERT_DATES: &str = "
    INSERT INTO public.date_dim (full_date, year, quarter, month, day)
    SELECT * FROM UNNEST($1::date[], $2::int[], $3::int[], $4::int[], $5::int[])
    ON CONFLICT (full_date) DO NOTHING";

const SELECT_DATE_IDS: &str = "SELECT date_id, full_date FROM public.date_dim WHERE full_date = ANY($1)";

const INSERT_SERIES: &str = "
    INSERT INTO fed.series_dim (series_id, series_name)
    VALUES ($1, $2)
    ON CONFLICT (series_id) DO NOTHING";

const INSERT_FACTS: &str = "
    INSERT INTO fed.series_fact (date_id, series_id, value)
    SELECT t.date_id, $2::text, t.value::numeric
    FROM UNNEST($1::int[], $3::float8[]) AS t(date_id, value)";

pub struct PgWarehouse {
    // Declared before `runtime` so the pool is torn down while the runtime still exists.
    pool: PgPool,
    runtime: Runtime,
}

impl PgWarehouse {
    pub fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let pool = runtime.block_on(
            PgPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(acquire_timeout)
                .connect(database_url),
        )?;
        debug!("connected to warehouse");
        Ok(Self { pool, runtime })
    }
}

impl Drop for PgWarehouse {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl Warehouse for PgWarehouse {
    fn transaction<T, F>(&mut self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn WarehouseTx) -> Result<T, StoreError>,
    {
        let tx = self.runtime.block_on(self.pool.begin())?;
        let mut scope = PgTx {
            runtime: &self.runtime,
            tx,
        };

        match work(&mut scope) {
            Ok(value) => {
                self.runtime.block_on(scope.tx.commit())?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.runtime.block_on(scope.tx.rollback()) {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

struct PgTx<'r> {
    runtime: &'r Runtime,
    tx: Transaction<'static, Postgres>,
}

impl PgTx<'_> {
    fn execute(&mut self, sql: &'static str) -> Result<u64, StoreError> {
        let result = self.runtime.block_on(sqlx::query(sql).execute(&mut *self.tx))?;
        Ok(result.rows_affected())
    }
}

impl WarehouseTx for PgTx<'_> {
    fn create_date_dim(&mut self) -> Result<(), StoreError> {
        self.execute(CREATE_DATE_DIM)?;
        Ok(())
    }

    fn stored_dates(&mut self, candidates: &BTreeSet<NaiveDate>) -> Result<HashSet<NaiveDate>, StoreError> {
        let dates: Vec<NaiveDate> = candidates.iter().copied().collect();
        let rows = self.runtime.block_on(
            sqlx::query_scalar::<_, NaiveDate>(SELECT_STORED_DATES)
                .bind(dates)
                .fetch_all(&mut *self.tx),
        )?;
        Ok(rows.into_iter().collect())
    }

    fn insert_dates(&mut self, rows: &[DateParts]) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let full_dates: Vec<NaiveDate> = rows.iter().map(|r| r.full_date).collect();
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        let quarters: Vec<i32> = rows.iter().map(|r| r.quarter).collect();
        let months: Vec<i32> = rows.iter().map(|r| r.month).collect();
        let days: Vec<i32> = rows.iter().map(|r| r.day).collect();

        let result = self.runtime.block_on(
            sqlx::query(INSERT_DATES)
                .bind(full_dates)
                .bind(years)
                .bind(quarters)
                .bind(months)
                .bind(days)
                .execute(&mut *self.tx),
        )?;
        Ok(result.rows_affected())
    }

    fn date_ids(&mut self, dates: &BTreeSet<NaiveDate>) -> Result<DateLookup, StoreError> {
        let dates: Vec<NaiveDate> = dates.iter().copied().collect();
        let rows = self.runtime.block_on(
            sqlx::query_as::<_, (i32, NaiveDate)>(SELECT_DATE_IDS)
                .bind(dates)
                .fetch_all(&mut *self.tx),
        )?;
        Ok(rows.into_iter().map(|(date_id, full_date)| (full_date, date_id)).collect())
    }

    fn create_series_dim(&mut self) -> Result<(), StoreError> {
        self.execute(CREATE_FED_SCHEMA)?;
        self.execute(CREATE_SERIES_DIM)?;
        Ok(())
    }

    fn insert_series(&mut self, row: &SeriesDimRow) -> Result<bool, StoreError> {
        let result = self.runtime.block_on(
            sqlx::query(INSERT_SERIES)
                .bind(&row.series_id)
                .bind(&row.series_name)
                .execute(&mut *self.tx),
        )?;
        Ok(result.rows_affected() == 1)
    }

    fn create_series_fact(&mut self) -> Result<(), StoreError> {
        self.execute(CREATE_FED_SCHEMA)?;
        self.execute(CREATE_SERIES_FACT)?;
        Ok(())
    }

    fn append_facts(&mut self, rows: &[NewFact]) -> Result<u64, StoreError> {
        let Some(first) = rows.first() else {
            return Ok(0);
        };
        if let Some(other) = rows.iter().find(|r| r.series_id != first.series_id) {
            return Err(StoreError::Constraint(format!(
                "fact batch mixes series {} and {}",
                first.series_id, other.series_id
            )));
        }
        let date_ids: Vec<i32> = rows.iter().map(|r| r.date_id).collect();
        let values: Vec<f64> = rows.iter().map(|r| r.value).collect();

        let result = self.runtime.block_on(
            sqlx::query(INSERT_FACTS)
                .bind(date_ids)
                .bind(first.series_id.as_str())
                .bind(values)
                .execute(&mut *self.tx),
        )?;
        Ok(result.rows_affected())
    }
}
