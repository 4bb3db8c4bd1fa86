//! A Rust library for interacting with the DHIS2 Web API.
//!
//! This library provides a typed client for DHIS2 instances: a query builder
//! for filtering, paging and ordering list endpoints, descriptor-driven access
//! to metadata, the data store, tracker events, analytics, and an async job
//! runner that drives bulk imports to completion.

#![warn(unused_crate_dependencies)]

// Only the `dhis2cli` binary installs a subscriber.
use tracing_subscriber as _;

/// Client functionality for interacting with the DHIS2 API
pub mod client;

/// Connection and polling configuration
pub mod config;

/// Error types
pub mod error;

/// Field selection macros for metadata requests
pub mod macros;

/// Representative object models
pub mod model;

/// Types for making requests to the DHIS2 API
pub mod request;

/// Types for handling responses from the DHIS2 API
pub mod response;

/// Query builders for list and analytics endpoints
pub mod query_api {
    pub use analytics::AnalyticsQuery;
    pub use query::{Direction, Filter, Operator, Order, Paging, Query, QueryError};

    /// Analytics queries
    pub mod analytics;
    /// Filtering, paging and ordering of list endpoints
    pub mod query;
}

/// Server-side jobs and the submit-then-poll runner
pub mod jobs {
    pub use model::{JobCategory, JobNotification, JobReference};
    pub use runner::{AsyncJobRunner, JobOutcome, JobStatusSource, Submission};

    /// Job references and notifications
    pub mod model;
    /// The polling state machine
    pub mod runner;
}

/// Native API functionality
pub mod native_api {
    /// Analytics data value sets
    pub mod analytics;
    /// Data store entries and namespaces
    pub mod datastore;
    /// Data value set imports
    pub mod datavalueset;
    /// Job notifications and async job submission
    pub mod jobs;
    /// Metadata resources
    pub mod metadata;
    /// Organisation unit hierarchy, levels, split and merge
    pub mod org_units;
    /// System info, status and settings
    pub mod system;
    /// Tracker events
    pub mod tracker;
}

/// Commonly used types and functions
pub mod prelude {
    pub use super::client::BaseClient;
    pub use super::config::{Authentication, Dhis2Config, PollConfig};
    pub use super::error::{Error, Result};
    pub use super::jobs::{AsyncJobRunner, JobOutcome, JobReference};
    pub use super::native_api::metadata::Resource;
    pub use super::native_api::{
        analytics, datastore, datavalueset, jobs, metadata, org_units, system, tracker,
    };
    pub use super::query_api::{AnalyticsQuery, Filter, Order, Paging, Query};
}

/// Command-line interface functionality
pub mod cli {
    /// Authentication commands
    pub mod auth;
    /// Base CLI functionality
    pub mod base;
    /// Data store commands
    pub mod datastore;
    /// Data value set import commands
    pub mod import;
    /// System information commands
    pub mod info;
    /// Metadata listing and retrieval commands
    pub mod metadata;
    /// Job notification commands
    pub mod tasks;
}

/// Test utilities
#[cfg(test)]
mod test_utils;
