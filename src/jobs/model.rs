use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{skip_serializing_none, DeserializeFromStr, SerializeDisplay};

use crate::client::api_path;

/// Category of a server-side job, as used in `system/tasks/<category>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum JobCategory {
    DataValueImport,
    MetadataImport,
    TrackerImportJob,
    EventImport,
    AnalyticsTable,
    CompleteDataSetRegistrationImport,
    /// Any category this client has no variant for.
    Other(String),
}

impl JobCategory {
    pub fn as_str(&self) -> &str {
        match self {
            JobCategory::DataValueImport => "DATAVALUE_IMPORT",
            JobCategory::MetadataImport => "METADATA_IMPORT",
            JobCategory::TrackerImportJob => "TRACKER_IMPORT_JOB",
            JobCategory::EventImport => "EVENT_IMPORT",
            JobCategory::AnalyticsTable => "ANALYTICS_TABLE",
            JobCategory::CompleteDataSetRegistrationImport => {
                "COMPLETE_DATA_SET_REGISTRATION_IMPORT"
            }
            JobCategory::Other(name) => name,
        }
    }
}

impl FromStr for JobCategory {
    type Err = Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(match input.to_uppercase().as_str() {
            "DATAVALUE_IMPORT" => JobCategory::DataValueImport,
            "METADATA_IMPORT" => JobCategory::MetadataImport,
            "TRACKER_IMPORT_JOB" => JobCategory::TrackerImportJob,
            "EVENT_IMPORT" => JobCategory::EventImport,
            "ANALYTICS_TABLE" => JobCategory::AnalyticsTable,
            "COMPLETE_DATA_SET_REGISTRATION_IMPORT" => {
                JobCategory::CompleteDataSetRegistrationImport
            }
            other => JobCategory::Other(other.to_string()),
        })
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies a job the server accepted for asynchronous processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReference {
    pub category: JobCategory,
    pub id: String,
}

impl JobReference {
    pub fn new(category: JobCategory, id: &str) -> Self {
        Self {
            category,
            id: id.to_string(),
        }
    }

    /// Extracts the reference from a submission body shaped
    /// `{"response": {"id": ..., "jobType": ...}}`.
    pub fn from_submission(body: &Value) -> Option<Self> {
        let response = body.get("response")?;
        let id = response.get("id")?.as_str()?;
        let job_type = response.get("jobType")?.as_str()?;

        match job_type.parse() {
            Ok(category) => Some(Self::new(category, id)),
            Err(never) => match never {},
        }
    }

    /// Path of the notification endpoint, relative to the API root.
    pub fn notifications_path(&self) -> String {
        api_path(&["system", "tasks", &self.category.to_string(), &self.id])
    }

    pub fn summary_path(&self) -> String {
        api_path(&["system", "taskSummaries", &self.category.to_string(), &self.id])
    }
}

impl fmt::Display for JobReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationLevel {
    Loop,
    Debug,
    Info,
    Warn,
    Error,
    #[serde(other)]
    Unknown,
}

/// A point-in-time status of a job.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobNotification {
    pub uid: Option<String>,
    pub level: Option<NotificationLevel>,
    pub category: Option<JobCategory>,
    pub time: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub data_type: Option<String>,
    pub data: Option<Value>,
}

impl JobNotification {
    /// A completed notification ends the job, successfully or not.
    pub fn is_terminal(&self) -> bool {
        self.completed
    }

    pub fn is_failure(&self) -> bool {
        self.completed && self.level == Some(NotificationLevel::Error)
    }
}

/// Picks the terminal notification that decides the job's outcome: the most
/// recent completed one. Ties keep the earlier entry, since the server lists
/// notifications newest first.
pub fn governing_notification(notifications: &[JobNotification]) -> Option<&JobNotification> {
    notifications
        .iter()
        .filter(|n| n.is_terminal())
        .fold(None, |best: Option<&JobNotification>, n| match best {
            Some(best) if best.time >= n.time => Some(best),
            _ => Some(n),
        })
}
