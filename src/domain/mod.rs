//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - fetched observations (`Observation`) and the requested window (`DateRange`)
//! - the warehouse row shapes (`DateParts`, `DateDimRow`, `SeriesDimRow`, `NewFact`, `FactRow`)
//! - the `full_date -> date_id` lookup (`DateLookup`)

pub mod types;

pub use types::*;
