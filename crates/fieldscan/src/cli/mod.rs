//! Command-line interface for fieldscan

pub mod config;
pub mod error;
pub mod output;
pub mod run;
