//! `fred-etl` library crate.
//!
//! The binary (`fred-etl`) is a thin wrapper around this library so that:
//!
//! - the load logic is testable without a database or network
//! - the batch can be embedded by other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod load;
pub mod logging;
pub mod report;
pub mod warehouse;
