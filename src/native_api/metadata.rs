//! Descriptor-driven access to metadata resources.
//!
//! Rather than one wrapper function per entity, each resource is described by
//! a [`Resource`] (API path plus field selections) and read or written through the
//! generic functions of this module with the response model of the caller's
//! choice.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::{api_path, evaluate_response, evaluate_web_message, BaseClient, Parameters};
use crate::error::Result;
use crate::query_api::query::Query;
use crate::request::RequestType;
use crate::response::{ImportReport, ListPage, ObjectReport, WebMessage};
use crate::{fields, id_fields, name_fields, nested_fields};

macro_rules! data_element_fields {
    () => {
        fields!(
            name_fields!(),
            "aggregationType",
            "valueType",
            "domainType",
            nested_fields!("legendSets", id_fields!())
        )
    };
}

macro_rules! category_fields {
    () => {
        fields!(name_fields!(), "dataDimensionType", "dataDimension")
    };
}

macro_rules! category_option_fields {
    () => {
        fields!(name_fields!(), "startDate", "endDate", "formName")
    };
}

macro_rules! org_unit_fields {
    () => {
        fields!(
            name_fields!(),
            "path",
            "level",
            "openingDate",
            "closedDate",
            nested_fields!("parent", id_fields!())
        )
    };
}

macro_rules! te_attribute_fields {
    () => {
        fields!(name_fields!(), "valueType", "aggregationType")
    };
}

/// Describes a metadata resource: where it lives and which fields to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    /// Path relative to the API root. List responses carry their items
    /// under the same key.
    pub path: &'static str,
    pub fields: &'static str,
    /// Fields requested when associations are expanded.
    pub expanded_fields: &'static str,
}

impl Resource {
    pub const fn new(path: &'static str, fields: &'static str) -> Self {
        Self {
            path,
            fields,
            expanded_fields: fields,
        }
    }

    pub const fn with_expanded_fields(self, expanded_fields: &'static str) -> Self {
        Self {
            expanded_fields,
            ..self
        }
    }

    /// The field selection to request for `query`.
    pub fn fields_for(&self, query: &Query) -> &'static str {
        if query.is_expand_associations() {
            self.expanded_fields
        } else {
            self.fields
        }
    }

    pub fn object_path(&self, id: &str) -> String {
        api_path(&[self.path, id])
    }
}

pub const ORGANISATION_UNITS: Resource = Resource::new("organisationUnits", org_unit_fields!());

pub const ORGANISATION_UNIT_GROUPS: Resource =
    Resource::new("organisationUnitGroups", name_fields!());

pub const ORGANISATION_UNIT_GROUP_SETS: Resource = Resource::new(
    "organisationUnitGroupSets",
    fields!(name_fields!(), nested_fields!("organisationUnitGroups", id_fields!())),
)
.with_expanded_fields(fields!(
    name_fields!(),
    nested_fields!("organisationUnitGroups", name_fields!())
));

pub const ORGANISATION_UNIT_LEVELS: Resource =
    Resource::new("organisationUnitLevels", fields!(id_fields!(), "level"));

pub const DATA_ELEMENTS: Resource = Resource::new("dataElements", data_element_fields!());

pub const DATA_ELEMENT_GROUPS: Resource = Resource::new("dataElementGroups", name_fields!())
    .with_expanded_fields(fields!(
        name_fields!(),
        nested_fields!("dataElements", data_element_fields!())
    ));

pub const DATA_ELEMENT_GROUP_SETS: Resource =
    Resource::new("dataElementGroupSets", name_fields!()).with_expanded_fields(fields!(
        name_fields!(),
        nested_fields!("dataElementGroups", name_fields!())
    ));

pub const CATEGORY_OPTIONS: Resource = Resource::new("categoryOptions", category_option_fields!());

pub const CATEGORIES: Resource = Resource::new("categories", category_fields!())
    .with_expanded_fields(fields!(
        category_fields!(),
        nested_fields!("categoryOptions", category_option_fields!())
    ));

pub const CATEGORY_COMBOS: Resource = Resource::new("categoryCombos", name_fields!())
    .with_expanded_fields(fields!(
        name_fields!(),
        nested_fields!("categories", category_fields!())
    ));

pub const PROGRAMS: Resource = Resource::new(
    "programs",
    fields!(
        name_fields!(),
        "programType",
        nested_fields!("categoryCombo", name_fields!()),
        nested_fields!("programStages", name_fields!()),
        nested_fields!("programTrackedEntityAttributes", name_fields!())
    ),
)
.with_expanded_fields(fields!(
    name_fields!(),
    "programType",
    nested_fields!(
        "categoryCombo",
        fields!(name_fields!(), nested_fields!("categories", category_fields!()))
    ),
    nested_fields!(
        "programStages",
        fields!(
            name_fields!(),
            nested_fields!(
                "programStageDataElements",
                fields!(name_fields!(), nested_fields!("dataElement", data_element_fields!()))
            )
        )
    ),
    nested_fields!(
        "programTrackedEntityAttributes",
        fields!(
            "id,code,name",
            nested_fields!("trackedEntityAttribute", te_attribute_fields!())
        )
    )
));

pub const CATEGORY_OPTION_GROUP_SETS: Resource =
    Resource::new("categoryOptionGroupSets", name_fields!()).with_expanded_fields(fields!(
        name_fields!(),
        nested_fields!("categoryOptionGroups", name_fields!())
    ));

pub const DIMENSIONS: Resource = Resource::new("dimensions", fields!(id_fields!(), "dimensionType"));

pub const ANALYTICS_TABLE_HOOKS: Resource = Resource::new("analyticsTableHooks", id_fields!());

pub const TRACKED_ENTITY_ATTRIBUTES: Resource =
    Resource::new("trackedEntityAttributes", te_attribute_fields!());

pub const PERIOD_TYPES: Resource =
    Resource::new("periodTypes", "frequencyOrder,name,isoDuration,isoFormat");

/// Every resource this crate ships a descriptor for.
pub const RESOURCES: &[Resource] = &[
    ORGANISATION_UNITS,
    ORGANISATION_UNIT_GROUPS,
    ORGANISATION_UNIT_GROUP_SETS,
    ORGANISATION_UNIT_LEVELS,
    DATA_ELEMENTS,
    DATA_ELEMENT_GROUPS,
    DATA_ELEMENT_GROUP_SETS,
    CATEGORY_OPTIONS,
    CATEGORIES,
    CATEGORY_COMBOS,
    CATEGORY_OPTION_GROUP_SETS,
    PROGRAMS,
    DIMENSIONS,
    ANALYTICS_TABLE_HOOKS,
    TRACKED_ENTITY_ATTRIBUTES,
    PERIOD_TYPES,
];

/// Looks up a descriptor by its API path, e.g. `dataElements`.
pub fn find_resource(path: &str) -> Option<&'static Resource> {
    RESOURCES.iter().find(|r| r.path == path)
}

/// Retrieves a single object of `resource`, with associations expanded.
///
/// # Arguments
///
/// * `client` - A reference to the `BaseClient` instance used to send the request.
/// * `resource` - The descriptor of the resource, e.g. [`DATA_ELEMENTS`].
/// * `id` - The identifier of the object.
///
/// # Errors
///
/// Returns [`crate::error::Error::NotFound`] if no such object exists, and
/// a decode error if the object does not match `T`.
pub async fn get_object<T>(client: &BaseClient, resource: &Resource, id: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let parameters = vec![("fields".to_string(), resource.expanded_fields.to_string())];

    let response = client
        .get(&resource.object_path(id), Some(parameters), RequestType::Plain)
        .await;

    evaluate_response::<T>(response).await
}

/// Retrieves one page of objects of `resource` matching `query`.
///
/// The query's filters, paging and order are rendered into URL parameters and
/// the field selection is picked with [`Resource::fields_for`].
pub async fn list_objects<T>(
    client: &BaseClient,
    resource: &Resource,
    query: &Query,
) -> Result<ListPage<T>>
where
    T: DeserializeOwned,
{
    let mut parameters: Parameters = query.to_params();
    parameters.push(("fields".to_string(), resource.fields_for(query).to_string()));

    let response = client
        .get(resource.path, Some(parameters), RequestType::Plain)
        .await;

    let body = evaluate_response::<Value>(response).await?;
    ListPage::from_value(body, resource.path)
}

/// Creates a single object.
pub async fn save_object<T>(
    client: &BaseClient,
    resource: &Resource,
    object: &T,
) -> Result<WebMessage<ObjectReport>>
where
    T: Serialize + ?Sized,
{
    let context = RequestType::json(object)?;
    let response = client.post(resource.path, None, context).await;

    evaluate_web_message::<ObjectReport>(response).await
}

/// Creates or updates several objects in one request through the bulk
/// metadata endpoint.
pub async fn save_objects<T>(
    client: &BaseClient,
    resource: &Resource,
    objects: &[T],
) -> Result<WebMessage<ImportReport>>
where
    T: Serialize,
{
    let mut body = Map::new();
    body.insert(resource.path.to_string(), serde_json::to_value(objects)?);

    let context = RequestType::json(&body)?;
    let response = client.post("metadata", None, context).await;

    evaluate_web_message::<ImportReport>(response).await
}

pub async fn update_object<T>(
    client: &BaseClient,
    resource: &Resource,
    id: &str,
    object: &T,
) -> Result<WebMessage<ObjectReport>>
where
    T: Serialize + ?Sized,
{
    let context = RequestType::json(object)?;
    let response = client.put(&resource.object_path(id), None, context).await;

    evaluate_web_message::<ObjectReport>(response).await
}

pub async fn remove_object(
    client: &BaseClient,
    resource: &Resource,
    id: &str,
) -> Result<WebMessage<ObjectReport>> {
    let response = client
        .delete(&resource.object_path(id), None, RequestType::Plain)
        .await;

    evaluate_web_message::<ObjectReport>(response).await
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::model::{DataElement, IdentifiableObject, OrgUnit, PeriodType};
    use crate::query_api::query::{Filter, Order};
    use crate::test_utils::mock_client;

    #[test]
    fn test_fields_for_query() {
        let query = Query::new();
        assert_eq!(CATEGORIES.fields_for(&query), category_fields!());

        let query = Query::new().expand_associations(true);
        assert!(CATEGORIES
            .fields_for(&query)
            .ends_with("categoryOptions[id,code,name,created,lastUpdated,shortName,description,startDate,endDate,formName]"));

        // Without expanded fields, both specs are the same
        assert_eq!(DIMENSIONS.fields_for(&query), "id,code,name,created,lastUpdated,dimensionType");
    }

    #[test]
    fn test_program_fields() {
        assert!(PROGRAMS.fields.starts_with(name_fields!()));
        assert!(PROGRAMS
            .expanded_fields
            .contains("programStageDataElements[id,code,name"));
        assert!(PROGRAMS.expanded_fields.ends_with("valueType,aggregationType]]"));
    }

    #[test]
    fn test_find_resource() {
        assert_eq!(find_resource("programs"), Some(&PROGRAMS));
        assert!(find_resource("users").is_none());
    }

    #[tokio::test]
    async fn test_get_object() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/dataElements/fbfJHSPpUQD")
                    .query_param("fields", data_element_fields!());
                then.status(200).json_body(json!({
                    "id": "fbfJHSPpUQD",
                    "name": "ANC 1st visit",
                    "valueType": "NUMBER"
                }));
            })
            .await;

        let element: DataElement = get_object(&mock_client(&server), &DATA_ELEMENTS, "fbfJHSPpUQD")
            .await
            .unwrap();

        assert_eq!(element.object.name.as_deref(), Some("ANC 1st visit"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_object() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/dataElements/missing");
                then.status(404).json_body(json!({
                    "httpStatus": "Not Found",
                    "httpStatusCode": 404,
                    "status": "ERROR",
                    "message": "DataElement with id missing could not be found."
                }));
            })
            .await;

        let err = get_object::<DataElement>(&mock_client(&server), &DATA_ELEMENTS, "missing")
            .await
            .unwrap_err();

        match err {
            Error::NotFound { message } => assert!(message.contains("could not be found")),
            other => panic!("Expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_objects_renders_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/organisationUnits")
                    .query_param("filter", "level:eq:2")
                    .query_param("filter", "id:in:[O6uvpzGd5pu,fdc6uOvgoji]")
                    .query_param("page", "2")
                    .query_param("pageSize", "50")
                    .query_param("order", "name:desc")
                    .query_param("fields", org_unit_fields!());
                then.status(200).json_body(json!({
                    "pager": {"page": 2, "pageCount": 2, "total": 52, "pageSize": 50},
                    "organisationUnits": [
                        {"id": "O6uvpzGd5pu", "name": "Bo", "level": 2},
                        {"id": "fdc6uOvgoji", "name": "Bombali", "level": 2}
                    ]
                }));
            })
            .await;

        let query = Query::new()
            .filter(Filter::eq("level", "2"))
            .filter(Filter::in_values("id", ["O6uvpzGd5pu", "fdc6uOvgoji"]))
            .page(2)
            .page_size(50)
            .order(Order::desc("name"));

        let page: ListPage<OrgUnit> = list_objects(&mock_client(&server), &ORGANISATION_UNITS, &query)
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].object.name.as_deref(), Some("Bombali"));
        assert_eq!(page.pager.unwrap().total, Some(52));
        mock.assert_async().await;
    }

    #[test]
    fn test_group_set_resources() {
        let query = Query::new().expand_associations(true);

        assert_eq!(DATA_ELEMENT_GROUP_SETS.fields, name_fields!());
        assert!(DATA_ELEMENT_GROUP_SETS
            .fields_for(&query)
            .ends_with(",dataElementGroups[id,code,name,created,lastUpdated,shortName,description]"));
        assert!(CATEGORY_OPTION_GROUP_SETS
            .fields_for(&query)
            .contains(",categoryOptionGroups["));
        assert_eq!(
            find_resource("categoryOptionGroupSets"),
            Some(&CATEGORY_OPTION_GROUP_SETS)
        );
    }

    #[tokio::test]
    async fn test_list_period_types() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/periodTypes")
                    .query_param("paging", "false")
                    .query_param("fields", "frequencyOrder,name,isoDuration,isoFormat");
                then.status(200).json_body(json!({
                    "periodTypes": [
                        {"frequencyOrder": 1, "name": "Daily", "isoDuration": "P1D", "isoFormat": "yyyyMMdd"},
                        {"frequencyOrder": 7, "name": "Weekly", "isoDuration": "P7D", "isoFormat": "yyyyWn"}
                    ]
                }));
            })
            .await;

        let page: ListPage<PeriodType> = list_objects(
            &mock_client(&server),
            &PERIOD_TYPES,
            &Query::new().without_paging(),
        )
        .await
        .unwrap();

        assert!(page.pager.is_none());
        assert_eq!(page.items[1].name.as_deref(), Some("Weekly"));
        assert_eq!(page.items[1].frequency_order, Some(7));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_save_object() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/organisationUnitGroups")
                    .json_body(json!({"id": "oRVt7g429ZO", "name": "Public facilities"}));
                then.status(201).json_body(json!({
                    "httpStatus": "Created",
                    "httpStatusCode": 201,
                    "status": "OK",
                    "response": {
                        "uid": "oRVt7g429ZO",
                        "klass": "org.hisp.dhis.organisationunit.OrganisationUnitGroup",
                        "errorReports": []
                    }
                }));
            })
            .await;

        let group = IdentifiableObject::new("oRVt7g429ZO", "Public facilities");
        let message = save_object(&mock_client(&server), &ORGANISATION_UNIT_GROUPS, &group)
            .await
            .unwrap();

        assert!(message.is_ok());
        assert_eq!(message.response.unwrap().uid.as_deref(), Some("oRVt7g429ZO"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_save_objects_uses_metadata_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/metadata").json_body(json!({
                    "categoryOptions": [
                        {"id": "FbLZS3ueWbQ", "name": "Male"},
                        {"id": "rQLFnNXXIL0", "name": "Female"}
                    ]
                }));
                then.status(200).json_body(json!({
                    "httpStatus": "OK",
                    "status": "OK",
                    "response": {
                        "status": "OK",
                        "stats": {"created": 2, "updated": 0, "deleted": 0, "ignored": 0, "total": 2}
                    }
                }));
            })
            .await;

        let options = [
            IdentifiableObject::new("FbLZS3ueWbQ", "Male"),
            IdentifiableObject::new("rQLFnNXXIL0", "Female"),
        ];
        let message = save_objects(&mock_client(&server), &CATEGORY_OPTIONS, &options)
            .await
            .unwrap();

        assert_eq!(message.response.unwrap().stats.unwrap().created, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_conflict_returns_error_reports() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/dataElements/fbfJHSPpUQD");
                then.status(409).json_body(json!({
                    "httpStatus": "Conflict",
                    "status": "ERROR",
                    "message": "One or more errors occurred, please see full details in import report.",
                    "response": {
                        "uid": "fbfJHSPpUQD",
                        "errorReports": [{
                            "message": "Missing required property `shortName`.",
                            "errorCode": "E4000",
                            "errorProperty": "shortName"
                        }]
                    }
                }));
            })
            .await;

        let element = DataElement::default();
        let message = update_object(&mock_client(&server), &DATA_ELEMENTS, "fbfJHSPpUQD", &element)
            .await
            .unwrap();

        assert!(!message.is_ok());
        assert_eq!(message.http_status_code, Some(409));
        let reports = message.response.unwrap().error_reports;
        assert_eq!(reports[0].error_code.as_deref(), Some("E4000"));
    }

    #[tokio::test]
    async fn test_remove_object() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/analyticsTableHooks/X8kW3cQbqGo");
                then.status(200).json_body(json!({
                    "httpStatus": "OK",
                    "status": "OK",
                    "response": {"uid": "X8kW3cQbqGo"}
                }));
            })
            .await;

        let message = remove_object(&mock_client(&server), &ANALYTICS_TABLE_HOOKS, "X8kW3cQbqGo")
            .await
            .unwrap();

        assert!(message.is_ok());
        mock.assert_async().await;
    }
}
