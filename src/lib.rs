//! RequestLens Core - per-request diagnostic record aggregation
//!
//! This crate provides the diagnostic record at the heart of RequestLens:
//! a per-request (or per-command) object that accumulates runtime telemetry
//! during the lifetime of one application request and exports it once, at
//! request end, as a JSON snapshot for an external inspection tool. The
//! implementation prioritizes:
//!
//! 1. **Safety** - instrumentation must never fail the monitored application
//! 2. **Determinism** - exports are pure, with a fixed, stable key set
//! 3. **Logging** - record lifecycle events logged with full context
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `record` - the diagnostic record, its append operations and id generation
//! - `snapshot` - the canonical export schema and tolerant value coercion
//! - `normalize` - JSON-safe normalization of external payloads
//! - `logging` - structured logging with record context
//!
//! ## Usage
//!
//! ```
//! use requestlens_core::DiagnosticRecord;
//! use serde_json::json;
//!
//! let mut record = DiagnosticRecord::new();
//! record.method = Some("GET".to_string());
//! record.add_database_query("SELECT * FROM users", json!([]), Some(1.2), Default::default());
//! record.user_data(Some("billing")).set("plan", "pro");
//!
//! let encoded = record.to_json();
//! assert!(encoded.starts_with("{\"id\":"));
//! ```

pub mod logging;
pub mod normalize;
pub mod record;
pub mod snapshot;

pub use record::entries::{
    AuthenticatedUser, CacheQuery, CacheQueryDetails, DatabaseQuery, DatabaseQueryDetails,
    EmailData, EmailEntry, EventDetails, EventEntry, RouteDetails, RouteEntry, Subrequest,
    SubrequestDetails, UserDetails, ViewData, ViewEntry,
};
pub use record::request::{DiagnosticRecord, RecordType, DATA_VERSION};
pub use record::user_data::{UserDataEntry, UserDataSlot, UserDataTab};
pub use snapshot::schema::{RecordSnapshot, SNAPSHOT_KEYS};
