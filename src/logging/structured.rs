//! Structured logging utilities.
//!
//! Provides context-aware logging with the record id and record type
//! included in every log message emitted by a diagnostic record.

use std::fmt;

/// Initialize the module-level logger.
///
/// Guarded so repeated calls are harmless; instrumentation layers call this
/// once at application start.
pub fn init() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .try_init();
}

/// Logging context for one diagnostic record.
#[derive(Debug, Clone)]
pub struct RecordContext {
    pub record_id: String,
    pub record_type: &'static str,
}

impl RecordContext {
    pub fn new(record_id: &str, record_type: &'static str) -> Self {
        Self {
            record_id: record_id.to_string(),
            record_type,
        }
    }
}

impl fmt::Display for RecordContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[record={}] [type={}]", self.record_id, self.record_type)
    }
}
