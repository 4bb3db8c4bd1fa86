use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use crate::error::{Error, Result};

/// Represents the status of a web message from the DHIS2 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Indicates a successful response. Import summaries spell it `SUCCESS`.
    #[serde(alias = "SUCCESS")]
    Ok,
    /// The operation succeeded with warnings, e.g. some values were ignored
    Warning,
    /// Indicates an error response
    Error,
}

impl Status {
    /// Returns the string representation of the status
    pub fn as_str(&self) -> &str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Error => "ERROR",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok | Status::Warning)
    }

    pub fn is_err(&self) -> bool {
        matches!(self, Status::Error)
    }
}

/// The envelope DHIS2 wraps write responses and errors in.
///
/// `response` holds the operation specific payload, such as an
/// [`ObjectReport`] or [`ImportSummary`].
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebMessage<T = Value> {
    pub http_status: Option<String>,
    pub http_status_code: Option<u16>,
    pub status: Option<Status>,
    pub message: Option<String>,
    pub response: Option<T>,
}

impl<T> WebMessage<T> {
    pub fn is_ok(&self) -> bool {
        self.status.map(|s| s.is_ok()).unwrap_or(false)
    }
}

/// Extracts a human-readable message from an error body, falling back to
/// the raw body when it is not a web message.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<WebMessage>(body) {
        Ok(WebMessage {
            message: Some(message),
            ..
        }) => message,
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.to_string(),
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: Option<String>,
    pub main_klass: Option<String>,
    pub error_code: Option<String>,
    pub error_klass: Option<String>,
    pub error_property: Option<String>,
}

/// Outcome of creating, updating or removing a single metadata object.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReport {
    pub uid: Option<String>,
    pub klass: Option<String>,
    #[serde(default)]
    pub error_reports: Vec<ErrorReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCount {
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub ignored: u64,
    #[serde(default)]
    pub deleted: u64,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConflict {
    pub object: Option<String>,
    pub value: Option<String>,
    pub error_code: Option<String>,
}

/// Summary of a data import, returned inline or as a job payload.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub status: Option<Status>,
    pub description: Option<String>,
    #[serde(default)]
    pub import_count: ImportCount,
    #[serde(default)]
    pub conflicts: Vec<ImportConflict>,
}

/// Outcome of a tracker import.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerReport {
    pub status: Option<Status>,
    pub stats: Option<Stats>,
    pub validation_report: Option<Value>,
}

/// Outcome of a bulk metadata import through `/api/metadata`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub status: Option<Status>,
    pub stats: Option<Stats>,
    #[serde(default)]
    pub type_reports: Vec<Value>,
}

/// Object counts reported by tracker and metadata imports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub deleted: u64,
    #[serde(default)]
    pub ignored: u64,
    #[serde(default)]
    pub total: u64,
}

/// Paging information of a list response.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    pub page: Option<u32>,
    pub page_count: Option<u32>,
    pub total: Option<u64>,
    pub page_size: Option<u32>,
    pub next_page: Option<String>,
}

/// One page of a list endpoint.
///
/// DHIS2 returns list items under a key named after the collection, e.g.
/// `{"pager": {...}, "dataElements": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage<T> {
    pub pager: Option<Pager>,
    pub items: Vec<T>,
}

impl<T: DeserializeOwned> ListPage<T> {
    /// Decodes a list response whose items live under `key`.
    pub fn from_value(mut value: Value, key: &str) -> Result<Self> {
        let pager = match value.get_mut("pager").map(Value::take) {
            Some(pager) => Some(
                serde_json::from_value(pager)
                    .map_err(|e| Error::decode("invalid pager", e))?,
            ),
            None => None,
        };

        let items = match value.get_mut(key).map(Value::take) {
            Some(items) => serde_json::from_value(items)
                .map_err(|e| Error::decode(format!("invalid items under '{key}'"), e))?,
            None => Vec::new(),
        };

        Ok(Self { pager, items })
    }
}
