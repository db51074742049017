//! Structured logging with record context.
//!
//! Provides a logging context and utilities that include the record id and
//! type in log messages for easy correlation.

pub mod structured;

pub use structured::*;
