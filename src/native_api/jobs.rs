//! Server-side jobs: notifications, task summaries and the submit-then-poll flow.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::{evaluate_response, BaseClient, Parameters};
use crate::error::{Error, Result};
use crate::jobs::model::{JobNotification, JobReference};
use crate::jobs::runner::{AsyncJobRunner, JobOutcome, JobStatusSource, Submission};
use crate::request::RequestType;
use crate::response::error_message;

/// Retrieves the notifications of a job, newest first.
pub async fn get_job_notifications(
    client: &BaseClient,
    reference: &JobReference,
) -> Result<Vec<JobNotification>> {
    let response = client
        .get(&reference.notifications_path(), None, RequestType::Plain)
        .await;
    evaluate_response::<Vec<JobNotification>>(response).await
}

/// Retrieves the summary a finished job left behind, e.g. the import summary
/// of a data value set import.
pub async fn get_task_summary<T>(client: &BaseClient, reference: &JobReference) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = client
        .get(&reference.summary_path(), None, RequestType::Plain)
        .await;
    evaluate_response::<T>(response).await
}

#[async_trait]
impl JobStatusSource for BaseClient {
    async fn job_notifications(&self, reference: &JobReference) -> Result<Vec<JobNotification>> {
        get_job_notifications(self, reference).await
    }
}

/// POSTs a payload to an endpoint that may process it asynchronously.
///
/// A 2xx or 409 answer is classified into an inline result or a job
/// reference. Any other status fails with the matching typed error.
pub async fn submit_job(
    client: &BaseClient,
    path: &str,
    parameters: Option<Parameters>,
    context: RequestType,
) -> Result<Submission> {
    let response = client.post(path, parameters, context).await?;
    let status = response.status();
    let raw_content = response.text().await?;

    if !status.is_success() && status != StatusCode::CONFLICT {
        warn!(status = status.as_u16(), path, "Submission rejected");
        return Err(Error::from_status(status.as_u16(), error_message(&raw_content)));
    }

    let body = serde_json::from_str::<Value>(&raw_content)
        .map_err(|e| Error::decode(format!("unexpected submission response from {path}"), e))?;

    let submission = Submission::from_body(body);
    if let Submission::Accepted(reference) = &submission {
        info!(job = %reference, "Job accepted");
    }

    Ok(submission)
}

/// Submits a payload and waits for the job to finish, using the poll timing
/// of the client's configuration.
///
/// When the terminal notification carries no data, the job's task summary is
/// fetched instead.
///
/// # Arguments
///
/// * `client` - A reference to the `BaseClient` instance used to send the requests.
/// * `path` - The endpoint to submit to, relative to the API root.
/// * `parameters` - Query parameters of the submission, such as `async=true`.
/// * `context` - The payload.
/// * `cancel` - An optional token that stops polling when cancelled.
///
/// # Errors
///
/// Fails without polling if the submission is rejected. While polling, fails
/// with [`Error::Timeout`] when the poll budget runs out or `cancel` fires,
/// and with [`Error::Server`] if the job reports a failure.
pub async fn run_async_job<T>(
    client: &BaseClient,
    path: &str,
    parameters: Option<Parameters>,
    context: RequestType,
    cancel: Option<CancellationToken>,
) -> Result<JobOutcome<T>>
where
    T: DeserializeOwned,
{
    let submission = submit_job(client, path, parameters, context).await?;

    let mut runner = AsyncJobRunner::new(client, *client.config().poll());
    if let Some(token) = cancel {
        runner = runner.with_cancellation(token);
    }

    match runner.run::<T>(submission).await? {
        JobOutcome::Completed {
            reference,
            notification,
            payload: None,
        } => {
            let payload = match get_task_summary::<T>(client, &reference).await {
                Ok(summary) => Some(summary),
                Err(err) => {
                    warn!(job = %reference, error = %err, "No task summary available");
                    None
                }
            };

            Ok(JobOutcome::Completed {
                reference,
                notification,
                payload,
            })
        }
        outcome => Ok(outcome),
    }
}
