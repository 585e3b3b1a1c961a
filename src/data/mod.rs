//! Upstream data: the series catalog and the FRED observation fetcher.

pub mod catalog;
pub mod fred;

pub use catalog::{Catalog, SeriesEntry};
pub use fred::{FredClient, ObservationSource};
