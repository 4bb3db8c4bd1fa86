//! Submit-then-poll driver for asynchronous imports.
//!
//! The server answers a bulk submission either with the import result or
//! with a [`JobReference`]. In the latter case [`AsyncJobRunner`] polls the
//! job's notifications on a fixed schedule until a terminal notification
//! shows up, the poll budget runs out or the caller cancels.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::error::{Error, Result};
use crate::jobs::model::{governing_notification, JobNotification, JobReference};

/// Where the runner fetches job notifications from.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_notifications(&self, reference: &JobReference) -> Result<Vec<JobNotification>>;
}

/// What the server answered to a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The payload was processed synchronously; the body is the result.
    Inline(Value),
    /// The payload was queued as a job.
    Accepted(JobReference),
}

impl Submission {
    /// Classifies a submission response body. An inline result wrapped in a
    /// web message is unwrapped to its `response`.
    pub fn from_body(body: Value) -> Self {
        if let Some(reference) = JobReference::from_submission(&body) {
            return Submission::Accepted(reference);
        }

        match body {
            Value::Object(mut map) if map.contains_key("httpStatus") => match map.remove("response") {
                Some(response) => Submission::Inline(response),
                None => Submission::Inline(Value::Object(map)),
            },
            body => Submission::Inline(body),
        }
    }
}

/// Final result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome<T> {
    Inline(T),
    Completed {
        reference: JobReference,
        notification: JobNotification,
        /// The notification's `data`, decoded, when the server attached any.
        payload: Option<T>,
    },
}

impl<T> JobOutcome<T> {
    pub fn payload(&self) -> Option<&T> {
        match self {
            JobOutcome::Inline(payload) => Some(payload),
            JobOutcome::Completed { payload, .. } => payload.as_ref(),
        }
    }

    pub fn into_payload(self) -> Option<T> {
        match self {
            JobOutcome::Inline(payload) => Some(payload),
            JobOutcome::Completed { payload, .. } => payload,
        }
    }

    pub fn reference(&self) -> Option<&JobReference> {
        match self {
            JobOutcome::Inline(_) => None,
            JobOutcome::Completed { reference, .. } => Some(reference),
        }
    }
}

pub struct AsyncJobRunner<'a, S: ?Sized> {
    source: &'a S,
    config: PollConfig,
    cancel: CancellationToken,
}

impl<'a, S> AsyncJobRunner<'a, S>
where
    S: JobStatusSource + ?Sized,
{
    pub fn new(source: &'a S, config: PollConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Polling stops with [`Error::Timeout`] once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Drives a submission to completion.
    pub async fn run<T: DeserializeOwned>(&self, submission: Submission) -> Result<JobOutcome<T>> {
        match submission {
            Submission::Inline(body) => {
                debug!("Submission processed synchronously");
                let payload = serde_json::from_value(body)
                    .map_err(|e| Error::decode("unexpected inline import result", e))?;
                Ok(JobOutcome::Inline(payload))
            }
            Submission::Accepted(reference) => self.poll(reference).await,
        }
    }

    /// Polls the notifications of `reference` until the job ends.
    ///
    /// Poll `k` fires at `start + k * interval`; a poll that would fire after
    /// `start + timeout` is not made. Transient failures are retried on the
    /// next tick, at most `max_poll_retries` times in a row. A timeout too
    /// large to represent as an instant means there is no deadline.
    pub async fn poll<T: DeserializeOwned>(&self, reference: JobReference) -> Result<JobOutcome<T>> {
        if self.config.interval.is_zero() {
            return Err(Error::Config("poll interval must be positive".to_string()));
        }

        info!(job = %reference, "Polling job notifications");

        let start = Instant::now();
        let deadline = start.checked_add(self.config.timeout);
        let mut polls: u32 = 0;
        let mut failures: u32 = 0;

        loop {
            // A poll that cannot be scheduled is past any deadline.
            let Some(next_poll) = self.next_poll(start, polls) else {
                return Err(self.timed_out(&reference, polls, start));
            };

            let past_deadline = deadline.is_some_and(|deadline| next_poll > deadline);
            if self.cancel.is_cancelled() || past_deadline {
                return Err(self.timed_out(&reference, polls, start));
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return Err(self.timed_out(&reference, polls, start));
                }
                _ = tokio::time::sleep_until(next_poll) => {}
            }

            polls += 1;

            let notifications = match self.source.job_notifications(&reference).await {
                Ok(notifications) => notifications,
                Err(err) if err.is_transient() && failures < self.config.max_poll_retries => {
                    failures += 1;
                    warn!(job = %reference, attempt = failures, error = %err, "Poll failed, retrying");
                    continue;
                }
                Err(err) => return Err(err),
            };

            failures = 0;

            let Some(notification) = governing_notification(&notifications) else {
                debug!(job = %reference, polls, "Job still running");
                continue;
            };

            if notification.is_failure() {
                let message = notification
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("job {reference} failed"));
                warn!(job = %reference, %message, "Job failed");
                return Err(Error::Server {
                    status: None,
                    message,
                });
            }

            info!(job = %reference, polls, "Job completed");

            let payload = match &notification.data {
                Some(data) => Some(
                    serde_json::from_value(data.clone())
                        .map_err(|e| Error::decode(format!("unexpected payload of job {reference}"), e))?,
                ),
                None => None,
            };

            return Ok(JobOutcome::Completed {
                notification: notification.clone(),
                reference,
                payload,
            });
        }
    }

    fn next_poll(&self, start: Instant, polls: u32) -> Option<Instant> {
        let offset = self.config.interval.checked_mul(polls.checked_add(1)?)?;
        start.checked_add(offset)
    }

    fn timed_out(&self, reference: &JobReference, polls: u32, start: Instant) -> Error {
        warn!(job = %reference, polls, "Giving up on job");
        Error::Timeout {
            polls,
            elapsed: start.elapsed(),
        }
    }
}
