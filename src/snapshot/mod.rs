//! Snapshot module.
//!
//! The canonical export form of a diagnostic record:
//! - stable, declaration-ordered key set
//! - tolerant value coercion for reconstructing records from snapshots

pub mod coerce;
pub mod schema;

pub use coerce::*;
pub use schema::*;
