//! The canonical snapshot schema.
//!
//! `RecordSnapshot` is the exported form of a diagnostic record. Its field
//! declaration order is the wire order; every key is always present, null
//! where unset, so consumers can rely on a fixed shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::json_safe::normalize;
use crate::record::entries::{
    AuthenticatedUser, CacheQuery, DatabaseQuery, EmailEntry, EventEntry, RouteEntry, Subrequest,
    ViewEntry,
};
use crate::record::request::RecordType;

/// Every snapshot key, in wire order.
pub const SNAPSHOT_KEYS: [&str; 53] = [
    "id",
    "version",
    "type",
    "time",
    "method",
    "url",
    "uri",
    "headers",
    "controller",
    "getData",
    "postData",
    "requestData",
    "sessionData",
    "authenticatedUser",
    "cookies",
    "responseTime",
    "responseStatus",
    "responseDuration",
    "memoryUsage",
    "middleware",
    "databaseQueries",
    "databaseQueriesCount",
    "databaseSlowQueries",
    "databaseSelects",
    "databaseInserts",
    "databaseUpdates",
    "databaseDeletes",
    "databaseOthers",
    "databaseDuration",
    "cacheQueries",
    "cacheReads",
    "cacheHits",
    "cacheWrites",
    "cacheDeletes",
    "cacheTime",
    "redisCommands",
    "queueJobs",
    "timelineData",
    "log",
    "events",
    "routes",
    "emailsData",
    "viewsData",
    "userData",
    "subrequests",
    "xdebug",
    "commandName",
    "commandArguments",
    "commandArgumentsDefaults",
    "commandOptions",
    "commandOptionsDefaults",
    "commandExitCode",
    "commandOutput",
];

/// The exported state of a diagnostic record at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordSnapshot {
    pub id: Option<String>,
    pub version: u32,
    #[serde(rename = "type")]
    pub record_type: RecordType,
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
    pub response_duration: Option<f64>,
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
    pub database_duration: f64,
    pub cache_queries: Vec<CacheQuery>,
    pub cache_reads: Option<u64>,
    pub cache_hits: Option<u64>,
    pub cache_writes: Option<u64>,
    pub cache_deletes: Option<u64>,
    pub cache_time: Option<f64>,
    pub redis_commands: Vec<Value>,
    pub queue_jobs: Vec<Value>,
    pub timeline_data: Vec<Value>,
    pub log: Vec<Value>,
    pub events: Vec<EventEntry>,
    pub routes: Vec<RouteEntry>,
    pub emails_data: Vec<EmailEntry>,
    pub views_data: Vec<ViewEntry>,
    pub user_data: Map<String, Value>,
    pub subrequests: Vec<Subrequest>,
    pub xdebug: Vec<Value>,
    pub command_name: Option<String>,
    pub command_arguments: Map<String, Value>,
    pub command_arguments_defaults: Map<String, Value>,
    pub command_options: Map<String, Value>,
    pub command_options_defaults: Map<String, Value>,
    pub command_exit_code: Option<i32>,
    pub command_output: Option<String>,
}

impl RecordSnapshot {
    /// Convert to a JSON value one field at a time, in wire order.
    ///
    /// A field that cannot be represented degrades to null on its own; the
    /// rest of the snapshot survives.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), normalize(&self.id));
        map.insert("version".into(), normalize(self.version));
        map.insert("type".into(), normalize(self.record_type));
        map.insert("time".into(), normalize(self.time));
        map.insert("method".into(), normalize(&self.method));
        map.insert("url".into(), normalize(&self.url));
        map.insert("uri".into(), normalize(&self.uri));
        map.insert("headers".into(), normalize(&self.headers));
        map.insert("controller".into(), normalize(&self.controller));
        map.insert("getData".into(), normalize(&self.get_data));
        map.insert("postData".into(), normalize(&self.post_data));
        map.insert("requestData".into(), normalize(&self.request_data));
        map.insert("sessionData".into(), normalize(&self.session_data));
        map.insert(
            "authenticatedUser".into(),
            normalize(&self.authenticated_user),
        );
        map.insert("cookies".into(), normalize(&self.cookies));
        map.insert("responseTime".into(), normalize(self.response_time));
        map.insert("responseStatus".into(), normalize(self.response_status));
        map.insert("responseDuration".into(), normalize(self.response_duration));
        map.insert("memoryUsage".into(), normalize(self.memory_usage));
        map.insert("middleware".into(), normalize(&self.middleware));
        map.insert("databaseQueries".into(), normalize(&self.database_queries));
        map.insert(
            "databaseQueriesCount".into(),
            normalize(self.database_queries_count),
        );
        map.insert(
            "databaseSlowQueries".into(),
            normalize(self.database_slow_queries),
        );
        map.insert("databaseSelects".into(), normalize(self.database_selects));
        map.insert("databaseInserts".into(), normalize(self.database_inserts));
        map.insert("databaseUpdates".into(), normalize(self.database_updates));
        map.insert("databaseDeletes".into(), normalize(self.database_deletes));
        map.insert("databaseOthers".into(), normalize(self.database_others));
        map.insert("databaseDuration".into(), normalize(self.database_duration));
        map.insert("cacheQueries".into(), normalize(&self.cache_queries));
        map.insert("cacheReads".into(), normalize(self.cache_reads));
        map.insert("cacheHits".into(), normalize(self.cache_hits));
        map.insert("cacheWrites".into(), normalize(self.cache_writes));
        map.insert("cacheDeletes".into(), normalize(self.cache_deletes));
        map.insert("cacheTime".into(), normalize(self.cache_time));
        map.insert("redisCommands".into(), normalize(&self.redis_commands));
        map.insert("queueJobs".into(), normalize(&self.queue_jobs));
        map.insert("timelineData".into(), normalize(&self.timeline_data));
        map.insert("log".into(), normalize(&self.log));
        map.insert("events".into(), normalize(&self.events));
        map.insert("routes".into(), normalize(&self.routes));
        map.insert("emailsData".into(), normalize(&self.emails_data));
        map.insert("viewsData".into(), normalize(&self.views_data));
        map.insert("userData".into(), normalize(&self.user_data));
        map.insert("subrequests".into(), normalize(&self.subrequests));
        map.insert("xdebug".into(), normalize(&self.xdebug));
        map.insert("commandName".into(), normalize(&self.command_name));
        map.insert("commandArguments".into(), normalize(&self.command_arguments));
        map.insert(
            "commandArgumentsDefaults".into(),
            normalize(&self.command_arguments_defaults),
        );
        map.insert("commandOptions".into(), normalize(&self.command_options));
        map.insert(
            "commandOptionsDefaults".into(),
            normalize(&self.command_options_defaults),
        );
        map.insert("commandExitCode".into(), normalize(self.command_exit_code));
        map.insert("commandOutput".into(), normalize(&self.command_output));
        Value::Object(map)
    }
}
