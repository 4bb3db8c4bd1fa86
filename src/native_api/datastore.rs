//! Key/value storage in the DHIS2 data store, grouped by namespace.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{api_path, evaluate_response, evaluate_web_message, BaseClient};
use crate::error::Result;
use crate::model::EntryMetadata;
use crate::request::RequestType;
use crate::response::WebMessage;

fn namespace_path(namespace: &str) -> String {
    api_path(&["dataStore", namespace])
}

fn entry_path(namespace: &str, key: &str) -> String {
    api_path(&["dataStore", namespace, key])
}

/// Lists all namespaces of the data store.
pub async fn get_namespaces(client: &BaseClient) -> Result<Vec<String>> {
    let response = client.get("dataStore", None, RequestType::Plain).await;
    evaluate_response::<Vec<String>>(response).await
}

/// Lists the keys of `namespace`.
pub async fn get_keys(client: &BaseClient, namespace: &str) -> Result<Vec<String>> {
    let response = client
        .get(&namespace_path(namespace), None, RequestType::Plain)
        .await;
    evaluate_response::<Vec<String>>(response).await
}

/// Retrieves the value stored under `namespace`/`key`, decoded as `T`.
///
/// # Arguments
///
/// * `client` - A reference to the `BaseClient` instance used to send the request.
/// * `namespace` - The namespace of the entry.
/// * `key` - The key of the entry.
///
/// # Errors
///
/// Returns [`crate::error::Error::NotFound`] if the entry does not exist.
pub async fn get_entry<T>(client: &BaseClient, namespace: &str, key: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = client
        .get(&entry_path(namespace, key), None, RequestType::Plain)
        .await;
    evaluate_response::<T>(response).await
}

pub async fn get_entry_metadata(
    client: &BaseClient,
    namespace: &str,
    key: &str,
) -> Result<EntryMetadata> {
    let path = api_path(&["dataStore", namespace, key, "metaData"]);
    let response = client.get(&path, None, RequestType::Plain).await;
    evaluate_response::<EntryMetadata>(response).await
}

/// Creates a new entry. The server answers 409 if the key already exists.
pub async fn save_entry<T>(
    client: &BaseClient,
    namespace: &str,
    key: &str,
    value: &T,
) -> Result<WebMessage>
where
    T: Serialize + ?Sized,
{
    let context = RequestType::json(value)?;
    let response = client
        .post(&entry_path(namespace, key), None, context)
        .await;
    evaluate_web_message(response).await
}

/// Replaces the value of an existing entry.
pub async fn update_entry<T>(
    client: &BaseClient,
    namespace: &str,
    key: &str,
    value: &T,
) -> Result<WebMessage>
where
    T: Serialize + ?Sized,
{
    let context = RequestType::json(value)?;
    let response = client.put(&entry_path(namespace, key), None, context).await;
    evaluate_web_message(response).await
}

pub async fn remove_entry(client: &BaseClient, namespace: &str, key: &str) -> Result<WebMessage> {
    let response = client
        .delete(&entry_path(namespace, key), None, RequestType::Plain)
        .await;
    evaluate_web_message(response).await
}

/// Removes `namespace` together with all of its entries.
pub async fn remove_namespace(client: &BaseClient, namespace: &str) -> Result<WebMessage> {
    let response = client
        .delete(&namespace_path(namespace), None, RequestType::Plain)
        .await;
    evaluate_web_message(response).await
}
