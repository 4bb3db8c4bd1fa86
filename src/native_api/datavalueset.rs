use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::{BaseClient, Parameters};
use crate::error::Result;
use crate::jobs::runner::JobOutcome;
use crate::model::DataValueSet;
use crate::native_api::jobs::run_async_job;
use crate::query_api::analytics::IdScheme;
use crate::request::RequestType;
use crate::response::ImportSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStrategy {
    Create,
    Update,
    CreateAndUpdate,
    Delete,
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ImportStrategy::Create => "CREATE",
            ImportStrategy::Update => "UPDATE",
            ImportStrategy::CreateAndUpdate => "CREATE_AND_UPDATE",
            ImportStrategy::Delete => "DELETE",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ImportStrategy {
    type Err = String;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        match input.to_uppercase().replace('-', "_").as_str() {
            "CREATE" => Ok(ImportStrategy::Create),
            "UPDATE" => Ok(ImportStrategy::Update),
            "CREATE_AND_UPDATE" => Ok(ImportStrategy::CreateAndUpdate),
            "DELETE" => Ok(ImportStrategy::Delete),
            _ => Err(format!("Unknown import strategy: {input}")),
        }
    }
}

/// Options of a data value set import. Unset options fall back to the
/// server's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataValueSetImportOptions {
    pub data_element_id_scheme: Option<IdScheme>,
    pub org_unit_id_scheme: Option<IdScheme>,
    pub category_option_combo_id_scheme: Option<IdScheme>,
    pub id_scheme: Option<IdScheme>,
    pub import_strategy: Option<ImportStrategy>,
    pub dry_run: Option<bool>,
    pub preheat_cache: Option<bool>,
    pub skip_audit: Option<bool>,
    pub skip_existing_check: Option<bool>,
    pub force: Option<bool>,
}

impl DataValueSetImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    pub fn import_strategy(mut self, strategy: ImportStrategy) -> Self {
        self.import_strategy = Some(strategy);
        self
    }

    pub fn id_scheme(mut self, scheme: IdScheme) -> Self {
        self.id_scheme = Some(scheme);
        self
    }

    /// Query parameters of the import. The import always runs as a job.
    pub fn to_params(&self) -> Parameters {
        let mut params = vec![("async".to_string(), "true".to_string())];

        let options: [(&str, Option<String>); 10] = [
            ("dataElementIdScheme", self.data_element_id_scheme.map(|s| s.to_string())),
            ("orgUnitIdScheme", self.org_unit_id_scheme.map(|s| s.to_string())),
            (
                "categoryOptionComboIdScheme",
                self.category_option_combo_id_scheme.map(|s| s.to_string()),
            ),
            ("idScheme", self.id_scheme.map(|s| s.to_string())),
            ("importStrategy", self.import_strategy.map(|s| s.to_string())),
            ("dryRun", self.dry_run.map(|b| b.to_string())),
            ("preheatCache", self.preheat_cache.map(|b| b.to_string())),
            ("skipAudit", self.skip_audit.map(|b| b.to_string())),
            ("skipExistingCheck", self.skip_existing_check.map(|b| b.to_string())),
            ("force", self.force.map(|b| b.to_string())),
        ];

        params.extend(
            options
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key.to_string(), value))),
        );

        params
    }
}

/// Imports a data value set and waits for the import job to finish.
///
/// # Arguments
///
/// * `client` - A reference to the `BaseClient` instance used to send the requests.
/// * `data_value_set` - The data values to import.
/// * `options` - The [`DataValueSetImportOptions`] of the import.
/// * `cancel` - An optional token that stops waiting for the job.
///
/// # Returns
///
/// The [`ImportSummary`] of the import, either returned inline by the server
/// or collected from the finished job.
pub async fn import_data_value_set(
    client: &BaseClient,
    data_value_set: &DataValueSet,
    options: &DataValueSetImportOptions,
    cancel: Option<CancellationToken>,
) -> Result<JobOutcome<ImportSummary>> {
    let context = RequestType::json(data_value_set)?;
    run_async_job(client, "dataValueSets", Some(options.to_params()), context, cancel).await
}

/// Imports a data value set from a JSON file and waits for the import job.
///
/// The file is sent as is, without being parsed first.
pub async fn import_data_value_set_file<P: AsRef<Path>>(
    client: &BaseClient,
    path: P,
    options: &DataValueSetImportOptions,
    cancel: Option<CancellationToken>,
) -> Result<JobOutcome<ImportSummary>> {
    let body = tokio::fs::read_to_string(path.as_ref()).await?;
    let context = RequestType::JSON { body };

    run_async_job(client, "dataValueSets", Some(options.to_params()), context, cancel).await
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::model::DataValue;
    use crate::test_utils::{fast_poll, mock_client_with_poll};

    fn accepted() -> serde_json::Value {
        json!({
            "httpStatus": "OK",
            "status": "OK",
            "response": {"id": "Kx1PsIgXzKO", "jobType": "DATAVALUE_IMPORT"}
        })
    }

    fn finished() -> serde_json::Value {
        json!([{
            "level": "INFO",
            "time": "2021-08-30T14:20:05.372",
            "message": "Import done",
            "completed": true,
            "data": {"status": "SUCCESS", "importCount": {"imported": 1}}
        }])
    }

    #[test]
    fn test_default_options_only_request_async() {
        assert_eq!(
            DataValueSetImportOptions::new().to_params(),
            vec![("async".to_string(), "true".to_string())]
        );
    }

    #[test]
    fn test_options_to_params() {
        let options = DataValueSetImportOptions::new()
            .id_scheme(IdScheme::Code)
            .import_strategy(ImportStrategy::CreateAndUpdate)
            .dry_run(true);

        assert_eq!(
            options.to_params(),
            vec![
                ("async".to_string(), "true".to_string()),
                ("idScheme".to_string(), "CODE".to_string()),
                ("importStrategy".to_string(), "CREATE_AND_UPDATE".to_string()),
                ("dryRun".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_import_strategy() {
        assert_eq!(
            "create-and-update".parse::<ImportStrategy>(),
            Ok(ImportStrategy::CreateAndUpdate)
        );
        assert_eq!("DELETE".parse::<ImportStrategy>(), Ok(ImportStrategy::Delete));
        assert!("MERGE".parse::<ImportStrategy>().is_err());
    }

    #[tokio::test]
    async fn test_import_data_value_set() {
        let server = MockServer::start_async().await;
        let submit = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/dataValueSets")
                    .query_param("async", "true")
                    .query_param("dryRun", "true")
                    .json_body(json!({
                        "dataSet": "pBOMPrpg1QX",
                        "dataValues": [{
                            "dataElement": "f7n9E0hX8qk",
                            "period": "202101",
                            "orgUnit": "DiszpKrYNg8",
                            "value": "12"
                        }]
                    }));
                then.status(200).json_body(accepted());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/system/tasks/DATAVALUE_IMPORT/Kx1PsIgXzKO");
                then.status(200).json_body(finished());
            })
            .await;

        let set = DataValueSet {
            data_set: Some("pBOMPrpg1QX".into()),
            data_values: vec![DataValue::new("f7n9E0hX8qk", "202101", "DiszpKrYNg8", "12")],
            ..Default::default()
        };

        let client = mock_client_with_poll(&server, fast_poll(20));
        let options = DataValueSetImportOptions::new().dry_run(true);
        let outcome = import_data_value_set(&client, &set, &options, None)
            .await
            .unwrap();

        assert_eq!(outcome.payload().unwrap().import_count.imported, 1);
        submit.assert_async().await;
    }

    #[tokio::test]
    async fn test_import_data_value_set_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"dataValues":[]}}"#).unwrap();

        let server = MockServer::start_async().await;
        let submit = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/dataValueSets")
                    .header("Content-Type", "application/json")
                    .body(r#"{"dataValues":[]}"#);
                then.status(200).json_body(accepted());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/system/tasks/DATAVALUE_IMPORT/Kx1PsIgXzKO");
                then.status(200).json_body(finished());
            })
            .await;

        let client = mock_client_with_poll(&server, fast_poll(20));
        let outcome = import_data_value_set_file(
            &client,
            file.path(),
            &DataValueSetImportOptions::new(),
            None,
        )
        .await
        .unwrap();

        assert!(outcome.reference().is_some());
        submit.assert_async().await;
    }
}
