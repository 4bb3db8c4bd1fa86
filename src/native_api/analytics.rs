use std::path::Path;

use crate::client::{evaluate_response, BaseClient};
use crate::error::{Error, Result};
use crate::model::DataValueSet;
use crate::query_api::analytics::AnalyticsQuery;
use crate::request::RequestType;
use crate::response::error_message;

const DATA_VALUE_SET: &str = "analytics/dataValueSet.json";

/// Retrieves aggregated analytics data as a data value set.
///
/// # Arguments
///
/// * `client` - A reference to the `BaseClient` instance used to send the request.
/// * `query` - The [`AnalyticsQuery`] selecting dimensions, filters and options.
pub async fn get_analytics_data_value_set(
    client: &BaseClient,
    query: &AnalyticsQuery,
) -> Result<DataValueSet> {
    let response = client
        .get(DATA_VALUE_SET, Some(query.to_params()), RequestType::Plain)
        .await;

    evaluate_response::<DataValueSet>(response).await
}

/// Streams the analytics data value set of `query` into the file at `path`,
/// without decoding it.
pub async fn write_analytics_data_value_set<P: AsRef<Path>>(
    client: &BaseClient,
    query: &AnalyticsQuery,
    path: P,
) -> Result<()> {
    let response = client
        .get(DATA_VALUE_SET, Some(query.to_params()), RequestType::Plain)
        .await?;

    let status = response.status();
    let content = response.bytes().await?;

    if !status.is_success() {
        let body = String::from_utf8_lossy(&content);
        return Err(Error::from_status(status.as_u16(), error_message(&body)));
    }

    tokio::fs::write(path.as_ref(), &content).await?;

    Ok(())
}
