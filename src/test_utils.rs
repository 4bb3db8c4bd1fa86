use std::time::Duration;

use httpmock::MockServer;

use crate::client::BaseClient;
use crate::config::{Dhis2Config, PollConfig};

/// A client authenticated as `admin:district` against `server`.
pub fn mock_client(server: &MockServer) -> BaseClient {
    mock_client_with_poll(server, PollConfig::default())
}

pub fn mock_client_with_poll(server: &MockServer, poll: PollConfig) -> BaseClient {
    let config =
        Dhis2Config::with_basic_auth(&server.base_url(), "admin", "district").with_poll_config(poll);
    BaseClient::new(config).expect("Failed to create client")
}

/// Poll timing short enough for tests against a real socket.
pub fn fast_poll(intervals: u32) -> PollConfig {
    PollConfig::new(
        Duration::from_millis(50),
        Duration::from_millis(50 * intervals as u64),
    )
}
