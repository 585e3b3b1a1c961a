//! Star-schema loading, one transaction per stage:
//!
//! - `dates`: date dimension (`ensure_dates`)
//! - `series`: series dimension (`ensure_series`)
//! - `facts`: fact append (`load_facts`)
//!
//! Stages commit independently. If a later stage fails, rows an earlier stage
//! committed stay in place; dimensions are shared, so that is harmless.

pub mod dates;
pub mod facts;
pub mod series;

pub use dates::*;
pub use facts::*;
pub use series::*;
