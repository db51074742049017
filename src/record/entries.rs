//! Typed telemetry entries.
//!
//! One struct per telemetry category, plus the per-operation detail structs
//! accepted by the record's append operations. Every optional field of an
//! entry serializes as an explicit null when unset, so the schema shape is
//! stable across all entries of a kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single executed database query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseQuery {
    pub query: String,
    /// Bound parameters, stored raw.
    pub bindings: Value,
    /// Execution time in milliseconds.
    pub duration: Option<f64>,
    pub connection: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub trace: Option<Value>,
    pub model: Option<String>,
    pub tags: Vec<String>,
}

/// Optional details for [`DatabaseQuery`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseQueryDetails {
    pub connection: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub trace: Option<Value>,
    pub model: Option<String>,
    pub tags: Vec<String>,
    /// Marks the query as slow; adds `"slow"` to the stored tag set.
    pub slow: bool,
}

/// A single cache interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheQuery {
    /// Interaction kind, e.g. `read`, `hit`, `write`, `delete`.
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
    /// Cached value, normalized before storage.
    pub value: Value,
    pub duration: Option<f64>,
    pub connection: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub trace: Option<Value>,
    pub expiration: Option<u64>,
}

/// Optional details for [`CacheQuery`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheQueryDetails {
    pub connection: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub trace: Option<Value>,
    pub expiration: Option<u64>,
}

/// A fired application event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntry {
    pub event: String,
    /// Event payload, normalized before storage.
    pub data: Value,
    pub time: Option<f64>,
    pub listeners: Option<Vec<String>>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub trace: Option<Value>,
}

/// Optional details for [`EventEntry`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDetails {
    pub listeners: Option<Vec<String>>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub trace: Option<Value>,
}

/// A registered application route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub method: String,
    pub uri: String,
    pub action: String,
    pub name: Option<String>,
    pub middleware: Option<Value>,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Optional details for [`RouteEntry`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDetails {
    pub name: Option<String>,
    pub middleware: Option<Value>,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// A sent email, wrapped in a `data` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailEntry {
    pub data: EmailData,
}

/// Payload of an [`EmailEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailData {
    pub subject: String,
    pub to: Value,
    pub from: Value,
    /// Message headers, normalized before storage.
    pub headers: Value,
}

/// A rendered view, wrapped in a `data` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEntry {
    pub data: ViewData,
}

/// Payload of a [`ViewEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewData {
    pub name: String,
    /// View data, normalized before storage.
    pub data: Value,
}

/// A link to another record spawned by this request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subrequest {
    pub url: String,
    /// Record id of the child request; a value, not a live reference.
    pub id: String,
    pub path: Option<String>,
}

/// Optional details for [`Subrequest`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubrequestDetails {
    pub path: Option<String>,
}

/// The authenticated identity attached to the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Value,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Optional details for [`AuthenticatedUser`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}
