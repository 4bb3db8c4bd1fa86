//! Organisation unit hierarchy, levels, and the split and merge operations.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{api_path, evaluate_response, evaluate_web_message, BaseClient, Parameters};
use crate::error::Result;
use crate::model::{OrgUnitLevel, OrgUnitMergeRequest, OrgUnitSplitRequest};
use crate::query_api::query::Query;
use crate::request::RequestType;
use crate::response::{ListPage, WebMessage};

use super::metadata::ORGANISATION_UNITS;

/// Retrieves the org units below `id` at `level`, relative to the parent,
/// where 1 is the level immediately below.
///
/// # Arguments
///
/// * `client` - A reference to the `BaseClient` instance used to send the request.
/// * `id` - The identifier of the parent org unit.
/// * `level` - The relative level of the org units to return.
/// * `query` - Filters, paging and order applied to the sub-hierarchy.
pub async fn get_org_unit_sub_hierarchy<T>(
    client: &BaseClient,
    id: &str,
    level: u32,
    query: &Query,
) -> Result<ListPage<T>>
where
    T: DeserializeOwned,
{
    let mut parameters: Parameters = query.to_params();
    parameters.push((
        "fields".to_string(),
        ORGANISATION_UNITS.fields_for(query).to_string(),
    ));
    parameters.push(("level".to_string(), level.to_string()));

    let response = client
        .get(
            &ORGANISATION_UNITS.object_path(id),
            Some(parameters),
            RequestType::Plain,
        )
        .await;

    let body = evaluate_response::<Value>(response).await?;
    ListPage::from_value(body, ORGANISATION_UNITS.path)
}

/// Retrieves all org unit levels, with gaps in the persisted levels filled
/// by generated ones.
pub async fn get_filled_org_unit_levels(client: &BaseClient) -> Result<Vec<OrgUnitLevel>> {
    let response = client
        .get("filledOrganisationUnitLevels", None, RequestType::Plain)
        .await;
    evaluate_response::<Vec<OrgUnitLevel>>(response).await
}

pub async fn split_org_unit(
    client: &BaseClient,
    request: &OrgUnitSplitRequest,
) -> Result<WebMessage> {
    let context = RequestType::json(request)?;
    let response = client
        .post(&api_path(&["organisationUnits", "split"]), None, context)
        .await;
    evaluate_web_message::<Value>(response).await
}

pub async fn merge_org_units(
    client: &BaseClient,
    request: &OrgUnitMergeRequest,
) -> Result<WebMessage> {
    let context = RequestType::json(request)?;
    let response = client
        .post(&api_path(&["organisationUnits", "merge"]), None, context)
        .await;
    evaluate_web_message::<Value>(response).await
}
