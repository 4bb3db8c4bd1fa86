//! Representative DHIS2 object models.
//!
//! Only a handful of resources ship with a typed model. Any other resource
//! can be read into `serde_json::Value` or a caller-defined type through the
//! descriptor-driven functions in [`crate::native_api::metadata`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

/// Properties shared by all identifiable metadata objects.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiableObject {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub description: Option<String>,
    pub created: Option<String>,
    pub last_updated: Option<String>,
}

impl IdentifiableObject {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataElement {
    #[serde(flatten)]
    pub object: IdentifiableObject,
    pub aggregation_type: Option<String>,
    pub value_type: Option<String>,
    pub domain_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legend_sets: Vec<IdentifiableObject>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    #[serde(flatten)]
    pub object: IdentifiableObject,
    pub path: Option<String>,
    pub level: Option<u32>,
    pub opening_date: Option<String>,
    pub closed_date: Option<String>,
    pub parent: Option<IdentifiableObject>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitLevel {
    #[serde(flatten)]
    pub object: IdentifiableObject,
    pub level: Option<u32>,
    pub offline_levels: Option<u32>,
}

/// How conflicting values are resolved when org units are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeStrategy {
    #[default]
    LastUpdated,
    Discard,
}

/// Splits `source` into `targets`. Data of the source is moved to
/// `primary_target`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitSplitRequest {
    pub source: String,
    pub targets: Vec<String>,
    pub primary_target: Option<String>,
    pub delete_source: Option<bool>,
}

/// Merges `sources` into `target`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitMergeRequest {
    pub sources: Vec<String>,
    pub target: String,
    pub data_value_merge_strategy: Option<MergeStrategy>,
    pub data_approval_merge_strategy: Option<MergeStrategy>,
    pub delete_sources: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOption {
    #[serde(flatten)]
    pub object: IdentifiableObject,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub form_name: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub version: Option<String>,
    pub revision: Option<String>,
    pub build_time: Option<String>,
    pub server_date: Option<String>,
    pub context_path: Option<String>,
    pub calendar: Option<String>,
    pub date_format: Option<String>,
    pub system_id: Option<String>,
    pub system_name: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodType {
    pub name: Option<String>,
    pub iso_duration: Option<String>,
    pub iso_format: Option<String>,
    pub frequency_order: Option<u32>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub username: Option<String>,
}

/// Bookkeeping of a data store entry, from `dataStore/<ns>/<key>/metaData`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub id: Option<String>,
    pub namespace: Option<String>,
    pub key: Option<String>,
    pub created: Option<String>,
    pub last_updated: Option<String>,
    pub created_by: Option<UserMetadata>,
    pub last_updated_by: Option<UserMetadata>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Active,
    Completed,
    Visited,
    Schedule,
    Overdue,
    Skipped,
}

/// A tracker event.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "event")]
    pub id: Option<String>,
    pub program: Option<String>,
    pub program_stage: Option<String>,
    pub enrollment: Option<String>,
    pub org_unit: Option<String>,
    pub attribute_option_combo: Option<String>,
    pub assigned_user: Option<String>,
    #[serde(default)]
    pub status: EventStatus,
    pub occurred_at: Option<String>,
    pub scheduled_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub completed_by: Option<String>,
    pub stored_by: Option<String>,
    pub follow_up: Option<bool>,
    pub deleted: Option<bool>,
    #[serde(default)]
    pub data_values: Vec<EventDataValue>,
}

impl Event {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDataValue {
    pub data_element: String,
    pub value: Option<String>,
    pub provided_elsewhere: Option<bool>,
    pub stored_by: Option<String>,
}

impl EventDataValue {
    pub fn new(data_element: &str, value: &str) -> Self {
        Self {
            data_element: data_element.to_string(),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }
}

/// Payload of the tracker import endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Events {
    #[serde(default)]
    pub events: Vec<Event>,
}

impl From<Vec<Event>> for Events {
    fn from(events: Vec<Event>) -> Self {
        Self { events }
    }
}

/// Aggregate data values, as imported through `dataValueSets` and exported
/// by `analytics/dataValueSet.json`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValueSet {
    pub data_set: Option<String>,
    pub complete_date: Option<String>,
    pub period: Option<String>,
    pub org_unit: Option<String>,
    pub attribute_option_combo: Option<String>,
    #[serde(default)]
    pub data_values: Vec<DataValue>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    pub data_element: Option<String>,
    pub period: Option<String>,
    pub org_unit: Option<String>,
    pub category_option_combo: Option<String>,
    pub attribute_option_combo: Option<String>,
    pub value: Option<String>,
    pub stored_by: Option<String>,
    pub comment: Option<String>,
    pub follow_up: Option<bool>,
}

impl DataValue {
    pub fn new(data_element: &str, period: &str, org_unit: &str, value: &str) -> Self {
        Self {
            data_element: Some(data_element.to_string()),
            period: Some(period.to_string()),
            org_unit: Some(org_unit.to_string()),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }
}

/// Key/value pairs returned by `systemSettings`.
pub type SystemSettings = serde_json::Map<String, Value>;
