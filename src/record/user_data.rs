//! Custom user data tabs.
//!
//! Callers can attach arbitrary named payloads to a record; the official
//! inspection tool presents each one as an additional tab.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize::json_safe::normalize;

/// A named auxiliary payload container attached to a diagnostic record.
///
/// Created through [`DiagnosticRecord::user_data`] and configured
/// builder-style afterwards.
///
/// [`DiagnosticRecord::user_data`]: crate::record::request::DiagnosticRecord::user_data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDataTab {
    title: Option<String>,
    content: Map<String, Value>,
}

impl UserDataTab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tab title, returning the tab for chaining.
    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn title_ref(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Store a content value under the given key, normalized for JSON
    /// safety. Returns the tab for chaining.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> &mut Self {
        self.content.insert(key.into(), normalize(value));
        self
    }

    /// The plain-mapping form used by the parent record's export.
    pub fn to_map(&self) -> Map<String, Value> {
        self.content.clone()
    }
}

/// A stored user data entry: either a structured tab built by the caller or
/// a raw value carried over from a reconstructed snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum UserDataEntry {
    Tab(UserDataTab),
    Raw(Value),
}

impl UserDataEntry {
    /// Normalize to the plain value form used in the exported snapshot.
    /// Both cases produce an equivalent plain-mapping shape.
    pub fn to_value(&self) -> Value {
        match self {
            UserDataEntry::Tab(tab) => Value::Object(tab.to_map()),
            UserDataEntry::Raw(value) => value.clone(),
        }
    }

    /// Borrow the entry as a tab, converting a raw value into a fresh tab
    /// with the given title first.
    pub(crate) fn ensure_tab(&mut self, title: Option<&str>) -> &mut UserDataTab {
        if let UserDataEntry::Raw(_) = self {
            let mut tab = UserDataTab::new();
            if let Some(title) = title {
                tab.title(title);
            }
            *self = UserDataEntry::Tab(tab);
        }
        match self {
            UserDataEntry::Tab(tab) => tab,
            UserDataEntry::Raw(_) => unreachable!(),
        }
    }
}

/// One slot in a record's user data collection.
///
/// Keyed slots are addressable through [`DiagnosticRecord::user_data`];
/// keyless slots were appended positionally.
///
/// [`DiagnosticRecord::user_data`]: crate::record::request::DiagnosticRecord::user_data
#[derive(Debug, Clone, PartialEq)]
pub struct UserDataSlot {
    pub key: Option<String>,
    pub entry: UserDataEntry,
}
