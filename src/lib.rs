//! Tally - local net worth tracker
//!
//! This library stores point-in-time balances for asset and liability
//! accounts and rebuilds a net worth time series and summary statistics
//! from them.

pub mod cli;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod reports;
pub mod utils;
