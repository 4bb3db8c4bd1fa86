use reqwest::StatusCode;

use crate::client::{evaluate_response, BaseClient};
use crate::error::{Error, Result};
use crate::model::{SystemInfo, SystemSettings};
use crate::request::RequestType;
use crate::response::error_message;

const SYSTEM_INFO: &str = "system/info";

/// Retrieves information about the DHIS2 instance, such as its version.
///
/// # Arguments
///
/// * `client` - A reference to the `BaseClient` instance used to send the request.
///
/// # Returns
///
/// A `Result` wrapping the [`SystemInfo`] of the instance.
pub async fn get_system_info(client: &BaseClient) -> Result<SystemInfo> {
    let response = client.get(SYSTEM_INFO, None, RequestType::Plain).await;
    evaluate_response::<SystemInfo>(response).await
}

/// Checks whether the instance is reachable with the configured credentials.
///
/// The HTTP status of `system/info` is returned as a value, so `401` (bad
/// credentials) or `404` (wrong URL) are not errors here. Only a failure to
/// reach the server at all is.
pub async fn get_status(client: &BaseClient) -> Result<StatusCode> {
    let response = client.get(SYSTEM_INFO, None, RequestType::Plain).await?;
    Ok(response.status())
}

/// Indicates whether an object exists at `path`, using a HEAD request.
///
/// `path` is relative to the API root, e.g. `dataElements/fbfJHSPpUQD`.
pub async fn object_exists(client: &BaseClient, path: &str) -> Result<bool> {
    let response = client.head(path).await?;
    let status = response.status();

    match status {
        s if s.is_success() => Ok(true),
        StatusCode::NOT_FOUND => Ok(false),
        s => Err(Error::from_status(s.as_u16(), error_message(""))),
    }
}

pub async fn get_system_settings(client: &BaseClient) -> Result<SystemSettings> {
    let response = client.get("systemSettings", None, RequestType::Plain).await;
    evaluate_response::<SystemSettings>(response).await
}
