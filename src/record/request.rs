//! The diagnostic record.
//!
//! One `DiagnosticRecord` exists per application request or console
//! command. Instrumentation appends telemetry to it over the lifetime of
//! the request and exports it exactly once at request end; the exported
//! snapshot is handed to an external storage or transport layer.
//!
//! No operation here returns an error. Malformed optional inputs degrade
//! to defaults, so the record can never fail the application it observes.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logging::structured::RecordContext;
use crate::normalize::json_safe::{finite, normalize};
use crate::snapshot::coerce::{
    as_entries, as_f64, as_i32, as_indexed, as_map, as_string, as_string_vec, as_u32, as_u64,
    as_values,
};
use crate::snapshot::schema::RecordSnapshot;

use super::entries::{
    AuthenticatedUser, CacheQuery, CacheQueryDetails, DatabaseQuery, DatabaseQueryDetails,
    EmailData, EmailEntry, EventDetails, EventEntry, RouteDetails, RouteEntry, Subrequest,
    SubrequestDetails, UserDetails, ViewData, ViewEntry,
};
use super::id::generate_record_id;
use super::user_data::{UserDataEntry, UserDataSlot, UserDataTab};

/// Wire-format version tag carried in every exported snapshot.
pub const DATA_VERSION: u32 = 1;

/// Kind of execution context a record covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    #[default]
    Request,
    Command,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Request => "request",
            RecordType::Command => "command",
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Telemetry aggregated over the lifetime of one request or command.
///
/// Fields are public: scalar request/response context and the externally
/// computed counters are set directly by the owning instrumentation, while
/// the append operations below guard the sequence invariants (one entry per
/// call, call order preserved, stable entry shape).
#[derive(Debug, Clone, Default)]
pub struct DiagnosticRecord {
    /// Unique record id, immutable once set by a constructor.
    pub id: Option<String>,
    /// Wire-format version tag.
    pub version: u32,
    pub record_type: RecordType,
    /// Request start, seconds since epoch.
    pub time: Option<f64>,

    pub method: Option<String>,
    pub url: Option<String>,
    pub uri: Option<String>,
    pub headers: Map<String, Value>,
    pub controller: Option<String>,
    pub get_data: Map<String, Value>,
    pub post_data: Map<String, Value>,
    pub request_data: Map<String, Value>,
    pub session_data: Map<String, Value>,
    pub authenticated_user: Option<AuthenticatedUser>,
    pub cookies: Map<String, Value>,

    pub response_time: Option<f64>,
    pub response_status: Option<u32>,
    /// Response processing time in milliseconds. Derived from
    /// `response_time` and `time` at export when not set here.
    pub response_duration: Option<f64>,
    /// Peak memory usage in bytes.
    pub memory_usage: Option<u64>,
    pub middleware: Vec<String>,

    pub database_queries: Vec<DatabaseQuery>,
    pub database_queries_count: Option<u64>,
    pub database_slow_queries: Option<u64>,
    pub database_selects: Option<u64>,
    pub database_inserts: Option<u64>,
    pub database_updates: Option<u64>,
    pub database_deletes: Option<u64>,
    pub database_others: Option<u64>,

    pub cache_queries: Vec<CacheQuery>,
    pub cache_reads: Option<u64>,
    pub cache_hits: Option<u64>,
    pub cache_writes: Option<u64>,
    pub cache_deletes: Option<u64>,
    pub cache_time: Option<f64>,

    /// Opaque externally-formatted sequences, stored as supplied.
    pub redis_commands: Vec<Value>,
    pub queue_jobs: Vec<Value>,
    pub timeline_data: Vec<Value>,
    pub xdebug: Vec<Value>,

    /// Log entries keyed by index. Indices may be sparse; export densifies
    /// them into a contiguous sequence in index order.
    pub log: BTreeMap<u64, Value>,

    pub events: Vec<EventEntry>,
    pub routes: Vec<RouteEntry>,
    pub emails_data: Vec<EmailEntry>,
    pub views_data: Vec<ViewEntry>,
    pub user_data: Vec<UserDataSlot>,
    pub subrequests: Vec<Subrequest>,

    pub command_name: Option<String>,
    pub command_arguments: Map<String, Value>,
    pub command_arguments_defaults: Map<String, Value>,
    pub command_options: Map<String, Value>,
    pub command_options_defaults: Map<String, Value>,
    pub command_exit_code: Option<i32>,
    pub command_output: Option<String>,
}

impl DiagnosticRecord {
    /// Create a fresh record with an autogenerated id and the current time.
    pub fn new() -> Self {
        let record = Self {
            id: Some(generate_record_id()),
            version: DATA_VERSION,
            time: Some(now_seconds()),
            ..Self::default()
        };
        log::debug!("{} RECORD_CREATED", record.context());
        record
    }

    /// Reconstruct a record from an external snapshot mapping, e.g. a
    /// parent-supplied subrequest payload.
    ///
    /// Every recognized key is coerced and applied; unrecognized keys are
    /// ignored, missing or malformed values leave the field at its default.
    pub fn from_snapshot(data: &Map<String, Value>) -> Self {
        let mut record = Self {
            version: DATA_VERSION,
            ..Self::default()
        };
        let mut applied = 0usize;

        if let Some(v) = data.get("id").and_then(as_string) {
            record.id = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("version").and_then(as_u32) {
            record.version = v;
            applied += 1;
        }
        if let Some(v) = data.get("type").and_then(RecordType::from_value) {
            record.record_type = v;
            applied += 1;
        }
        if let Some(v) = data.get("time").and_then(as_f64) {
            record.time = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("method").and_then(as_string) {
            record.method = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("url").and_then(as_string) {
            record.url = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("uri").and_then(as_string) {
            record.uri = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("headers").and_then(as_map) {
            record.headers = v;
            applied += 1;
        }
        if let Some(v) = data.get("controller").and_then(as_string) {
            record.controller = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("getData").and_then(as_map) {
            record.get_data = v;
            applied += 1;
        }
        if let Some(v) = data.get("postData").and_then(as_map) {
            record.post_data = v;
            applied += 1;
        }
        if let Some(v) = data.get("requestData").and_then(as_map) {
            record.request_data = v;
            applied += 1;
        }
        if let Some(v) = data.get("sessionData").and_then(as_map) {
            record.session_data = v;
            applied += 1;
        }
        if let Some(v) = data
            .get("authenticatedUser")
            .and_then(|v| serde_json::from_value::<AuthenticatedUser>(v.clone()).ok())
        {
            record.authenticated_user = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("cookies").and_then(as_map) {
            record.cookies = v;
            applied += 1;
        }
        if let Some(v) = data.get("responseTime").and_then(as_f64) {
            record.response_time = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("responseStatus").and_then(as_u32) {
            record.response_status = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("responseDuration").and_then(as_f64) {
            record.response_duration = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("memoryUsage").and_then(as_u64) {
            record.memory_usage = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("middleware").and_then(as_string_vec) {
            record.middleware = v;
            applied += 1;
        }
        if let Some(v) = data.get("databaseQueries").and_then(as_entries) {
            record.database_queries = v;
            applied += 1;
        }
        if let Some(v) = data.get("databaseQueriesCount").and_then(as_u64) {
            record.database_queries_count = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("databaseSlowQueries").and_then(as_u64) {
            record.database_slow_queries = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("databaseSelects").and_then(as_u64) {
            record.database_selects = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("databaseInserts").and_then(as_u64) {
            record.database_inserts = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("databaseUpdates").and_then(as_u64) {
            record.database_updates = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("databaseDeletes").and_then(as_u64) {
            record.database_deletes = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("databaseOthers").and_then(as_u64) {
            record.database_others = Some(v);
            applied += 1;
        }
        // databaseDuration is always recomputed at export, never stored.
        if let Some(v) = data.get("cacheQueries").and_then(as_entries) {
            record.cache_queries = v;
            applied += 1;
        }
        if let Some(v) = data.get("cacheReads").and_then(as_u64) {
            record.cache_reads = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("cacheHits").and_then(as_u64) {
            record.cache_hits = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("cacheWrites").and_then(as_u64) {
            record.cache_writes = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("cacheDeletes").and_then(as_u64) {
            record.cache_deletes = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("cacheTime").and_then(as_f64) {
            record.cache_time = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("redisCommands").and_then(as_values) {
            record.redis_commands = v;
            applied += 1;
        }
        if let Some(v) = data.get("queueJobs").and_then(as_values) {
            record.queue_jobs = v;
            applied += 1;
        }
        if let Some(v) = data.get("timelineData").and_then(as_values) {
            record.timeline_data = v;
            applied += 1;
        }
        if let Some(v) = data.get("log").and_then(as_indexed) {
            record.log = v;
            applied += 1;
        }
        if let Some(v) = data.get("events").and_then(as_entries) {
            record.events = v;
            applied += 1;
        }
        if let Some(v) = data.get("routes").and_then(as_entries) {
            record.routes = v;
            applied += 1;
        }
        if let Some(v) = data.get("emailsData").and_then(as_entries) {
            record.emails_data = v;
            applied += 1;
        }
        if let Some(v) = data.get("viewsData").and_then(as_entries) {
            record.views_data = v;
            applied += 1;
        }
        if let Some(v) = data.get("userData").and_then(user_data_slots) {
            record.user_data = v;
            applied += 1;
        }
        if let Some(v) = data.get("subrequests").and_then(as_entries) {
            record.subrequests = v;
            applied += 1;
        }
        if let Some(v) = data.get("xdebug").and_then(as_values) {
            record.xdebug = v;
            applied += 1;
        }
        if let Some(v) = data.get("commandName").and_then(as_string) {
            record.command_name = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("commandArguments").and_then(as_map) {
            record.command_arguments = v;
            applied += 1;
        }
        if let Some(v) = data.get("commandArgumentsDefaults").and_then(as_map) {
            record.command_arguments_defaults = v;
            applied += 1;
        }
        if let Some(v) = data.get("commandOptions").and_then(as_map) {
            record.command_options = v;
            applied += 1;
        }
        if let Some(v) = data.get("commandOptionsDefaults").and_then(as_map) {
            record.command_options_defaults = v;
            applied += 1;
        }
        if let Some(v) = data.get("commandExitCode").and_then(as_i32) {
            record.command_exit_code = Some(v);
            applied += 1;
        }
        if let Some(v) = data.get("commandOutput").and_then(as_string) {
            record.command_output = Some(v);
            applied += 1;
        }

        log::debug!("{} RECORD_RESTORED fields={}", record.context(), applied);
        record
    }

    /// Append an executed database query.
    ///
    /// Bindings are stored raw; `details.slow` adds `"slow"` to the stored
    /// tag set.
    pub fn add_database_query(
        &mut self,
        query: impl Into<String>,
        bindings: Value,
        duration: Option<f64>,
        details: DatabaseQueryDetails,
    ) {
        let mut tags = details.tags;
        if details.slow && !tags.iter().any(|tag| tag == "slow") {
            tags.push("slow".to_string());
        }
        self.database_queries.push(DatabaseQuery {
            query: query.into(),
            bindings,
            duration: finite(duration),
            connection: details.connection,
            file: details.file,
            line: details.line,
            trace: details.trace,
            model: details.model,
            tags,
        });
    }

    /// Append a cache interaction. The value is normalized before storage.
    pub fn add_cache_query(
        &mut self,
        kind: impl Into<String>,
        key: impl Into<String>,
        value: impl Serialize,
        duration: Option<f64>,
        details: CacheQueryDetails,
    ) {
        self.cache_queries.push(CacheQuery {
            kind: kind.into(),
            key: key.into(),
            value: normalize(value),
            duration: finite(duration),
            connection: details.connection,
            file: details.file,
            line: details.line,
            trace: details.trace,
            expiration: details.expiration,
        });
    }

    /// Append a fired event. The payload is normalized before storage.
    pub fn add_event(
        &mut self,
        event: impl Into<String>,
        data: impl Serialize,
        time: Option<f64>,
        details: EventDetails,
    ) {
        self.events.push(EventEntry {
            event: event.into(),
            data: normalize(data),
            time: finite(time),
            listeners: details.listeners,
            file: details.file,
            line: details.line,
            trace: details.trace,
        });
    }

    /// Append a registered route.
    pub fn add_route(
        &mut self,
        method: impl Into<String>,
        uri: impl Into<String>,
        action: impl Into<String>,
        details: RouteDetails,
    ) {
        self.routes.push(RouteEntry {
            method: method.into(),
            uri: uri.into(),
            action: action.into(),
            name: details.name,
            middleware: details.middleware,
            before: details.before,
            after: details.after,
        });
    }

    /// Append a sent email. Headers are normalized before storage.
    pub fn add_email(
        &mut self,
        subject: impl Into<String>,
        to: impl Serialize,
        from: impl Serialize,
        headers: impl Serialize,
    ) {
        self.emails_data.push(EmailEntry {
            data: EmailData {
                subject: subject.into(),
                to: normalize(to),
                from: normalize(from),
                headers: normalize(headers),
            },
        });
    }

    /// Append a rendered view. The view data is normalized before storage.
    pub fn add_view(&mut self, name: impl Into<String>, data: impl Serialize) {
        self.views_data.push(ViewEntry {
            data: ViewData {
                name: name.into(),
                data: normalize(data),
            },
        });
    }

    /// Append a link to a subrequest record by its id.
    pub fn add_subrequest(
        &mut self,
        url: impl Into<String>,
        id: impl Into<String>,
        details: SubrequestDetails,
    ) {
        self.subrequests.push(Subrequest {
            url: url.into(),
            id: id.into(),
            path: details.path,
        });
    }

    /// Set the authenticated identity, replacing any previous one.
    pub fn set_authenticated_user(
        &mut self,
        username: impl Into<String>,
        id: impl Serialize,
        details: UserDetails,
    ) {
        self.authenticated_user = Some(AuthenticatedUser {
            id: normalize(id),
            username: username.into(),
            email: details.email,
            name: details.name,
        });
    }

    /// Append a log entry after the highest existing index.
    pub fn add_log_entry(&mut self, entry: impl Serialize) {
        let index = self.log.keys().next_back().map_or(0, |last| last + 1);
        self.log.insert(index, normalize(entry));
    }

    /// Place a log entry at an explicit index. Gaps are allowed; export
    /// densifies the sequence.
    pub fn set_log_entry(&mut self, index: u64, entry: impl Serialize) {
        self.log.insert(index, normalize(entry));
    }

    /// Look up or create a custom user data tab.
    ///
    /// With a key, returns the existing tab under that key if there is one,
    /// else creates, stores and returns a new tab titled with the key.
    /// Without a key, always appends a fresh positional tab.
    pub fn user_data(&mut self, key: Option<&str>) -> &mut UserDataTab {
        let index = match key {
            Some(key) => match self
                .user_data
                .iter()
                .position(|slot| slot.key.as_deref() == Some(key))
            {
                Some(index) => index,
                None => {
                    let mut tab = UserDataTab::new();
                    tab.title(key);
                    self.user_data.push(UserDataSlot {
                        key: Some(key.to_string()),
                        entry: UserDataEntry::Tab(tab),
                    });
                    self.user_data.len() - 1
                }
            },
            None => {
                self.user_data.push(UserDataSlot {
                    key: None,
                    entry: UserDataEntry::Tab(UserDataTab::new()),
                });
                self.user_data.len() - 1
            }
        };
        self.user_data[index].entry.ensure_tab(key)
    }

    /// Sum of the durations of all stored database queries, in
    /// milliseconds. Queries without a duration count as 0.
    pub fn database_duration(&self) -> f64 {
        self.database_queries
            .iter()
            .filter_map(|query| finite(query.duration))
            .sum()
    }

    /// Export the record's current state as a canonical snapshot.
    ///
    /// Pure and deterministic: derived aggregates are computed here, the
    /// log is densified, user data entries take their plain-mapping form.
    pub fn export(&self) -> RecordSnapshot {
        let snapshot = RecordSnapshot {
            id: self.id.clone(),
            version: self.version,
            record_type: self.record_type,
            time: finite(self.time),
            method: self.method.clone(),
            url: self.url.clone(),
            uri: self.uri.clone(),
            headers: self.headers.clone(),
            controller: self.controller.clone(),
            get_data: self.get_data.clone(),
            post_data: self.post_data.clone(),
            request_data: self.request_data.clone(),
            session_data: self.session_data.clone(),
            authenticated_user: self.authenticated_user.clone(),
            cookies: self.cookies.clone(),
            response_time: finite(self.response_time),
            response_status: self.response_status,
            response_duration: self.effective_response_duration(),
            memory_usage: self.memory_usage,
            middleware: self.middleware.clone(),
            database_queries: self.database_queries.clone(),
            database_queries_count: self.database_queries_count,
            database_slow_queries: self.database_slow_queries,
            database_selects: self.database_selects,
            database_inserts: self.database_inserts,
            database_updates: self.database_updates,
            database_deletes: self.database_deletes,
            database_others: self.database_others,
            database_duration: self.database_duration(),
            cache_queries: self.cache_queries.clone(),
            cache_reads: self.cache_reads,
            cache_hits: self.cache_hits,
            cache_writes: self.cache_writes,
            cache_deletes: self.cache_deletes,
            cache_time: finite(self.cache_time),
            redis_commands: self.redis_commands.clone(),
            queue_jobs: self.queue_jobs.clone(),
            timeline_data: self.timeline_data.clone(),
            log: self.log.values().cloned().collect(),
            events: self.events.clone(),
            routes: self.routes.clone(),
            emails_data: self.emails_data.clone(),
            views_data: self.views_data.clone(),
            user_data: self.exported_user_data(),
            subrequests: self.subrequests.clone(),
            xdebug: self.xdebug.clone(),
            command_name: self.command_name.clone(),
            command_arguments: self.command_arguments.clone(),
            command_arguments_defaults: self.command_arguments_defaults.clone(),
            command_options: self.command_options.clone(),
            command_options_defaults: self.command_options_defaults.clone(),
            command_exit_code: self.command_exit_code,
            command_output: self.command_output.clone(),
        };

        log::debug!(
            "{} EXPORT_COMPLETE queries={} cache={} events={} log={}",
            self.context(),
            snapshot.database_queries.len(),
            snapshot.cache_queries.len(),
            snapshot.events.len(),
            snapshot.log.len()
        );

        snapshot
    }

    /// Serialize the exported snapshot to JSON.
    ///
    /// Never fails: unencodable values degrade to null field by field, and
    /// a residual encoder error degrades to the string `"null"`.
    pub fn to_json(&self) -> String {
        let value = self.export().to_value();
        match serde_json::to_string(&value) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("{} ENCODE_FALLBACK error={}", self.context(), e);
                "null".to_string()
            }
        }
    }

    /// Explicit response duration when set and non-zero, else derived from
    /// response time and request start when both are known.
    fn effective_response_duration(&self) -> Option<f64> {
        match finite(self.response_duration) {
            Some(explicit) if explicit != 0.0 => Some(explicit),
            _ => match (finite(self.response_time), finite(self.time)) {
                (Some(response_time), Some(time)) => Some((response_time - time) * 1000.0),
                _ => None,
            },
        }
    }

    /// User data slots in their exported mapping form: explicit key where
    /// present, else the slot position rendered as a string.
    fn exported_user_data(&self) -> Map<String, Value> {
        let mut exported = Map::new();
        for (position, slot) in self.user_data.iter().enumerate() {
            let key = slot
                .key
                .clone()
                .unwrap_or_else(|| position.to_string());
            exported.insert(key, slot.entry.to_value());
        }
        exported
    }

    fn context(&self) -> RecordContext {
        RecordContext::new(
            self.id.as_deref().unwrap_or("-"),
            self.record_type.as_str(),
        )
    }
}

/// Current time as seconds since epoch with microsecond precision.
fn now_seconds() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

/// Read user data slots out of a snapshot value. Object keys become slot
/// keys; a plain sequence becomes positional slots.
fn user_data_slots(value: &Value) -> Option<Vec<UserDataSlot>> {
    match value {
        Value::Object(map) => Some(
            map.iter()
                .map(|(key, entry)| UserDataSlot {
                    key: Some(key.clone()),
                    entry: UserDataEntry::Raw(entry.clone()),
                })
                .collect(),
        ),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|entry| UserDataSlot {
                    key: None,
                    entry: UserDataEntry::Raw(entry.clone()),
                })
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_record_has_id_and_time() {
        let record = DiagnosticRecord::new();
        assert!(record.id.is_some());
        assert!(record.time.is_some());
        assert_eq!(record.version, DATA_VERSION);
        assert_eq!(record.record_type, RecordType::Request);
    }

    #[test]
    fn test_fresh_records_have_distinct_ids() {
        let a = DiagnosticRecord::new();
        let b = DiagnosticRecord::new();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_database_query_entry_shape() {
        let mut record = DiagnosticRecord::new();
        record.add_database_query(
            "SELECT * FROM users",
            json!([]),
            Some(12.3),
            DatabaseQueryDetails {
                connection: Some("mysql".to_string()),
                ..Default::default()
            },
        );

        let snapshot = record.export();
        let entry = serde_json::to_value(&snapshot.database_queries[0]).unwrap();
        assert_eq!(
            entry,
            json!({
                "query": "SELECT * FROM users",
                "bindings": [],
                "duration": 12.3,
                "connection": "mysql",
                "file": null,
                "line": null,
                "trace": null,
                "model": null,
                "tags": []
            })
        );
    }

    #[test]
    fn test_slow_query_tagging() {
        let mut record = DiagnosticRecord::new();
        record.add_database_query(
            "SELECT 1",
            json!([]),
            Some(2500.0),
            DatabaseQueryDetails {
                slow: true,
                ..Default::default()
            },
        );
        record.add_database_query(
            "SELECT 2",
            json!([]),
            None,
            DatabaseQueryDetails {
                tags: vec!["report".to_string()],
                slow: true,
                ..Default::default()
            },
        );

        assert_eq!(record.database_queries[0].tags, vec!["slow"]);
        assert_eq!(record.database_queries[1].tags, vec!["report", "slow"]);
    }

    #[test]
    fn test_later_appends_do_not_mutate_earlier_entries() {
        let mut record = DiagnosticRecord::new();
        record.add_database_query("SELECT 1", json!([]), None, Default::default());
        let first = record.database_queries[0].clone();

        record.add_database_query(
            "SELECT 2",
            json!([1]),
            Some(9.9),
            DatabaseQueryDetails {
                slow: true,
                ..Default::default()
            },
        );
        assert_eq!(record.database_queries[0], first);
    }

    #[test]
    fn test_appends_preserve_call_order() {
        let mut record = DiagnosticRecord::new();
        for i in 0..10 {
            record.add_event(format!("event.{}", i), json!(i), None, Default::default());
        }

        let snapshot = record.export();
        assert_eq!(snapshot.events.len(), 10);
        for (i, entry) in snapshot.events.iter().enumerate() {
            assert_eq!(entry.event, format!("event.{}", i));
        }
    }

    #[test]
    fn test_cache_query_value_is_normalized() {
        let mut record = DiagnosticRecord::new();
        record.add_cache_query("write", "metrics", f64::NAN, Some(0.2), Default::default());

        assert_eq!(record.cache_queries[0].value, Value::Null);
        assert_eq!(record.cache_queries[0].kind, "write");
    }

    #[test]
    fn test_add_email_and_view_wrappers() {
        let mut record = DiagnosticRecord::new();
        record.add_email(
            "Welcome",
            vec!["a@example.com"],
            "noreply@example.com",
            json!({"X-Priority": "1"}),
        );
        record.add_view("users.index", json!({"count": 3}));

        let snapshot = record.export();
        let email = serde_json::to_value(&snapshot.emails_data[0]).unwrap();
        assert_eq!(
            email,
            json!({
                "data": {
                    "subject": "Welcome",
                    "to": ["a@example.com"],
                    "from": "noreply@example.com",
                    "headers": {"X-Priority": "1"}
                }
            })
        );

        let view = serde_json::to_value(&snapshot.views_data[0]).unwrap();
        assert_eq!(
            view,
            json!({"data": {"name": "users.index", "data": {"count": 3}}})
        );
    }

    #[test]
    fn test_add_subrequest() {
        let mut record = DiagnosticRecord::new();
        record.add_subrequest(
            "http://localhost/api",
            "1700000000-0001-7",
            SubrequestDetails {
                path: Some("/custom/store".to_string()),
            },
        );
        record.add_subrequest("http://localhost/other", "1700000000-0002-9", Default::default());

        assert_eq!(record.subrequests[0].path.as_deref(), Some("/custom/store"));
        assert_eq!(record.subrequests[1].path, None);
    }

    #[test]
    fn test_authenticated_user_replaced_wholesale() {
        let mut record = DiagnosticRecord::new();
        record.set_authenticated_user(
            "alice",
            1,
            UserDetails {
                email: Some("alice@example.com".to_string()),
                name: Some("Alice".to_string()),
            },
        );
        record.set_authenticated_user("bob", 2, Default::default());

        let user = record.authenticated_user.as_ref().unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.id, json!(2));
        assert_eq!(user.email, None);
        assert_eq!(user.name, None);
    }

    #[test]
    fn test_user_data_keyed_lookup_is_idempotent() {
        let mut record = DiagnosticRecord::new();
        record.user_data(Some("tab1")).set("count", 1);
        record.user_data(Some("tab1")).set("extra", true);

        assert_eq!(record.user_data.len(), 1);
        let snapshot = record.export();
        assert_eq!(
            snapshot.user_data.get("tab1"),
            Some(&json!({"count": 1, "extra": true}))
        );
    }

    #[test]
    fn test_user_data_without_key_appends() {
        let mut record = DiagnosticRecord::new();
        record.user_data(None).set("a", 1);
        record.user_data(None).set("b", 2);

        assert_eq!(record.user_data.len(), 2);
        let snapshot = record.export();
        assert_eq!(snapshot.user_data.get("0"), Some(&json!({"a": 1})));
        assert_eq!(snapshot.user_data.get("1"), Some(&json!({"b": 2})));
    }

    #[test]
    fn test_log_is_densified_in_index_order() {
        let mut record = DiagnosticRecord::new();
        record.set_log_entry(2, json!({"message": "second"}));
        record.set_log_entry(0, json!({"message": "first"}));
        record.set_log_entry(7, json!({"message": "third"}));
        record.add_log_entry(json!({"message": "fourth"}));

        let snapshot = record.export();
        let messages: Vec<&str> = snapshot
            .log
            .iter()
            .map(|entry| entry["message"].as_str().unwrap())
            .collect();
        assert_eq!(messages, vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn test_response_duration_derived() {
        let mut record = DiagnosticRecord::new();
        record.time = Some(100.0);
        record.response_time = Some(100.25);

        assert_eq!(record.export().response_duration, Some(250.0));
    }

    #[test]
    fn test_response_duration_explicit_wins() {
        let mut record = DiagnosticRecord::new();
        record.time = Some(100.0);
        record.response_time = Some(100.25);
        record.response_duration = Some(99.0);

        assert_eq!(record.export().response_duration, Some(99.0));
    }

    #[test]
    fn test_response_duration_zero_falls_back_to_derivation() {
        let mut record = DiagnosticRecord::new();
        record.time = Some(100.0);
        record.response_time = Some(100.25);
        record.response_duration = Some(0.0);

        assert_eq!(record.export().response_duration, Some(250.0));
    }

    #[test]
    fn test_response_duration_missing_operands_is_null() {
        let mut record = DiagnosticRecord::new();
        record.time = None;
        record.response_time = None;

        assert_eq!(record.export().response_duration, None);
    }

    #[test]
    fn test_database_duration_sums_with_missing_as_zero() {
        let mut record = DiagnosticRecord::new();
        assert_eq!(record.database_duration(), 0.0);

        record.add_database_query("SELECT 1", json!([]), Some(1.5), Default::default());
        record.add_database_query("SELECT 2", json!([]), None, Default::default());
        record.add_database_query("SELECT 3", json!([]), Some(2.25), Default::default());

        assert_eq!(record.database_duration(), 3.75);
        assert_eq!(record.export().database_duration, 3.75);
    }

    #[test]
    fn test_from_snapshot_applies_recognized_keys() {
        let data = json!({
            "id": "1700000000-1234-42",
            "type": "command",
            "responseStatus": 0,
            "commandName": "queue:work",
            "commandExitCode": 1,
            "middleware": ["web"],
            "log": [{"message": "restored"}],
            "neverHeardOf": {"ignored": true}
        });

        let record = DiagnosticRecord::from_snapshot(data.as_object().unwrap());
        assert_eq!(record.id.as_deref(), Some("1700000000-1234-42"));
        assert_eq!(record.record_type, RecordType::Command);
        assert_eq!(record.command_name.as_deref(), Some("queue:work"));
        assert_eq!(record.command_exit_code, Some(1));
        assert_eq!(record.middleware, vec!["web"]);
        assert_eq!(record.log.len(), 1);
    }

    #[test]
    fn test_from_snapshot_missing_keys_stay_default() {
        let data = json!({"method": "GET"});
        let record = DiagnosticRecord::from_snapshot(data.as_object().unwrap());

        assert_eq!(record.method.as_deref(), Some("GET"));
        assert_eq!(record.id, None);
        assert_eq!(record.time, None);
        assert!(record.database_queries.is_empty());
        assert_eq!(record.version, DATA_VERSION);
    }

    #[test]
    fn test_from_snapshot_malformed_values_stay_default() {
        let data = json!({
            "responseStatus": "not a number",
            "headers": [1, 2, 3],
            "databaseQueries": "oops"
        });
        let record = DiagnosticRecord::from_snapshot(data.as_object().unwrap());

        assert_eq!(record.response_status, None);
        assert!(record.headers.is_empty());
        assert!(record.database_queries.is_empty());
    }

    #[test]
    fn test_export_round_trip_is_fixed_point() {
        let mut record = DiagnosticRecord::new();
        record.method = Some("POST".to_string());
        record.url = Some("http://localhost/users".to_string());
        record.response_time = record.time.map(|t| t + 0.125);
        record.response_status = Some(201);
        record.memory_usage = Some(8_388_608);
        record.middleware = vec!["web".to_string(), "auth".to_string()];
        record.database_queries_count = Some(2);
        record.add_database_query(
            "INSERT INTO users VALUES (?)",
            json!(["carol"]),
            Some(4.5),
            DatabaseQueryDetails {
                connection: Some("mysql".to_string()),
                model: Some("User".to_string()),
                ..Default::default()
            },
        );
        record.add_cache_query("hit", "users:count", 41, Some(0.3), Default::default());
        record.add_event("user.created", json!({"id": 7}), None, Default::default());
        record.add_route("POST", "/users", "UserController@store", Default::default());
        record.add_subrequest("http://localhost/avatar", "1700000000-0001-3", Default::default());
        record.set_authenticated_user("carol", 7, Default::default());
        record.add_log_entry(json!({"level": "info", "message": "created"}));
        record.user_data(Some("billing")).set("plan", "pro");

        let first = record.export();
        let value = first.to_value();
        let restored = DiagnosticRecord::from_snapshot(value.as_object().unwrap());
        let second = restored.export();

        assert_eq!(second, first);
    }

    #[test]
    fn test_to_json_survives_unencodable_leaf() {
        let mut record = DiagnosticRecord::new();
        record.add_event("ok", json!(1), None, Default::default());
        // Bypass the append guard entirely; a NaN smuggled into a stored
        // entry must not break encoding.
        record.database_queries.push(DatabaseQuery {
            query: "SELECT 1".to_string(),
            bindings: json!([]),
            duration: Some(f64::NAN),
            connection: None,
            file: None,
            line: None,
            trace: None,
            model: None,
            tags: Vec::new(),
        });

        let encoded = record.to_json();
        let parsed: Value = serde_json::from_str(&encoded).unwrap();

        // The bad leaf degrades to null in place; everything else survives.
        assert_eq!(parsed["databaseQueries"][0]["duration"], Value::Null);
        assert_eq!(parsed["databaseQueries"][0]["query"], json!("SELECT 1"));
        assert_eq!(parsed["id"].as_str(), record.id.as_deref());
        assert_eq!(parsed["events"][0]["event"], json!("ok"));
        assert_eq!(parsed["databaseDuration"], json!(0.0));
    }

    #[test]
    fn test_command_record_export() {
        let mut record = DiagnosticRecord::new();
        record.record_type = RecordType::Command;
        record.command_name = Some("cache:clear".to_string());
        record
            .command_options
            .insert("force".to_string(), json!(true));
        record.command_exit_code = Some(0);
        record.command_output = Some("Cache cleared.".to_string());

        let value = record.export().to_value();
        assert_eq!(value["type"], json!("command"));
        assert_eq!(value["commandName"], json!("cache:clear"));
        assert_eq!(value["commandOptions"], json!({"force": true}));
        assert_eq!(value["commandExitCode"], json!(0));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        #[test]
        fn appends_preserve_length_and_order(
            queries in proptest::collection::vec("[a-z ]{1,24}", 0..32)
        ) {
            let mut record = DiagnosticRecord::new();
            for query in &queries {
                record.add_database_query(query.clone(), json!([]), None, Default::default());
            }

            let snapshot = record.export();
            prop_assert_eq!(snapshot.database_queries.len(), queries.len());
            for (entry, query) in snapshot.database_queries.iter().zip(&queries) {
                prop_assert_eq!(&entry.query, query);
            }
        }

        #[test]
        fn database_duration_is_sum_of_durations(
            durations in proptest::collection::vec(
                proptest::option::of(0.0f64..10_000.0),
                0..32,
            )
        ) {
            let mut record = DiagnosticRecord::new();
            for duration in &durations {
                record.add_database_query("SELECT 1", json!([]), *duration, Default::default());
            }

            let expected: f64 = durations.iter().flatten().sum();
            prop_assert!((record.database_duration() - expected).abs() < 1e-9);
        }

        #[test]
        fn log_export_is_dense_and_ordered(
            indices in proptest::collection::btree_set(0u64..1000, 0..24)
        ) {
            let mut record = DiagnosticRecord::new();
            // Insert in reverse so export order cannot come from call order.
            for index in indices.iter().rev() {
                record.set_log_entry(*index, json!(index));
            }

            let snapshot = record.export();
            prop_assert_eq!(snapshot.log.len(), indices.len());
            let exported: Vec<u64> = snapshot
                .log
                .iter()
                .map(|entry| entry.as_u64().unwrap())
                .collect();
            let expected: Vec<u64> = indices.into_iter().collect();
            prop_assert_eq!(exported, expected);
        }
    }
}
