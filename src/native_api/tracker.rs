//! Tracker events, imported synchronously through the tracker endpoint.

use crate::client::{api_path, evaluate_report, evaluate_response, BaseClient, Parameters};
use crate::error::Result;
use crate::model::{Event, Events};
use crate::request::RequestType;
use crate::response::TrackerReport;

fn import_params(strategy: &str) -> Parameters {
    vec![
        ("async".to_string(), "false".to_string()),
        ("importStrategy".to_string(), strategy.to_string()),
    ]
}

/// Creates or updates events. The operation is synchronous.
///
/// A rejected import (409) is returned as a report with the validation
/// errors rather than as an error.
pub async fn save_events(client: &BaseClient, events: &Events) -> Result<TrackerReport> {
    let context = RequestType::json(events)?;
    let response = client
        .post("tracker", Some(import_params("CREATE_AND_UPDATE")), context)
        .await;

    let (_, report) = evaluate_report::<TrackerReport>(response).await?;
    Ok(report)
}

pub async fn get_event(client: &BaseClient, id: &str) -> Result<Event> {
    let path = api_path(&["tracker", "events", id]);
    let response = client.get(&path, None, RequestType::Plain).await;
    evaluate_response::<Event>(response).await
}

/// Deletes the event with the given identifier.
pub async fn remove_event(client: &BaseClient, id: &str) -> Result<TrackerReport> {
    let events = Events::from(vec![Event::new(id)]);
    let context = RequestType::json(&events)?;
    let response = client
        .post("tracker", Some(import_params("DELETE")), context)
        .await;

    let (_, report) = evaluate_report::<TrackerReport>(response).await?;
    Ok(report)
}
