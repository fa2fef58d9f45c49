//! Result type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the result link in a raw provider record
pub const LINK: &str = "link";
/// Key holding the result title in a raw provider record
pub const TITLE: &str = "title";
/// Key holding the optional description in a raw provider record
pub const DESCRIPTION: &str = "description";
/// Key holding the optional RFC 3339 date in a raw provider record
pub const DATE: &str = "date";

/// A single normalized search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Result {
    /// Resolvable link of the hit
    pub link: String,
    /// Short label
    pub title: String,
    /// Free text, empty when the provider had none
    #[serde(default)]
    pub description: String,
    /// Date of the hit, `None` when unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl Result {
    /// Create a new result without description or date
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
            description: String::new(),
            date: None,
        }
    }

    /// Add a description to the result
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a date to the result
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Normalize a raw provider record.
    ///
    /// `link` and `title` must be present as strings. A missing or non-string
    /// description becomes empty, and a date that is missing or does not parse
    /// as RFC 3339 is treated as unknown.
    pub fn from_raw(raw: &RawResult) -> std::result::Result<Self, MalformedResult> {
        let link = raw.str_field(LINK).ok_or(MalformedResult::MissingField(LINK))?;
        let title = raw
            .str_field(TITLE)
            .ok_or(MalformedResult::MissingField(TITLE))?;

        Ok(Self {
            link: link.to_string(),
            title: title.to_string(),
            description: raw.str_field(DESCRIPTION).unwrap_or_default().to_string(),
            date: raw.date(),
        })
    }

    /// Date formatted as `YYYY-MM-DD`, if known
    pub fn short_date(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// A raw record that violates the provider contract
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedResult {
    #[error("result is missing the required `{0}` field")]
    MissingField(&'static str),
}

/// Loosely-typed record returned by a provider.
///
/// Providers only need to fill `link` and `title`; `description` and `date`
/// are optional and any other keys are carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResult {
    fields: Map<String, Value>,
}

impl RawResult {
    /// Create a raw record with the two required fields
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self::default()
            .with_field(LINK, Value::String(link.into()))
            .with_field(TITLE, Value::String(title.into()))
    }

    /// Set the description
    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.with_field(DESCRIPTION, Value::String(description.into()))
    }

    /// Set the date
    pub fn with_date(self, date: DateTime<Utc>) -> Self {
        self.with_field(DATE, date.to_rfc3339())
    }

    /// Set an arbitrary field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Get a field by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a field if it holds a string
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.str_field(DATE)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))
    }
}

impl From<Map<String, Value>> for RawResult {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
