//! Data value set import command
//!
//! The import is submitted as a job and polled until it finishes. Poll timing
//! defaults to the client configuration and can be overridden per call.

use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;

use crate::client::BaseClient;
use crate::native_api::datavalueset::{
    import_data_value_set_file, DataValueSetImportOptions, ImportStrategy,
};

use super::base::{block_on, evaluate_and_print_response, Matcher};

#[derive(StructOpt, Debug)]
#[structopt(about = "Import a data value set and wait for the import job")]
pub struct ImportCommand {
    #[structopt(short, long, help = "Path to the data value set JSON file")]
    file: PathBuf,

    #[structopt(long, help = "Validate the import without saving any values")]
    dry_run: bool,

    #[structopt(long, help = "CREATE, UPDATE, CREATE_AND_UPDATE or DELETE")]
    strategy: Option<ImportStrategy>,

    #[structopt(long, help = "Seconds between two job status polls")]
    interval: Option<u64>,

    #[structopt(long, help = "Seconds to wait for the job before giving up")]
    timeout: Option<u64>,

    #[structopt(long, help = "Consecutive failed polls to tolerate")]
    retries: Option<u32>,
}

impl ImportCommand {
    fn options(&self) -> DataValueSetImportOptions {
        DataValueSetImportOptions {
            dry_run: self.dry_run.then_some(true),
            import_strategy: self.strategy,
            ..Default::default()
        }
    }

    fn client(&self, client: &BaseClient) -> BaseClient {
        let mut poll = *client.config().poll();

        if let Some(interval) = self.interval {
            poll.interval = Duration::from_secs(interval);
        }
        if let Some(timeout) = self.timeout {
            poll.timeout = Duration::from_secs(timeout);
        }
        if let Some(retries) = self.retries {
            poll.max_poll_retries = retries;
        }

        client.clone().with_poll_config(poll)
    }
}

impl Matcher for ImportCommand {
    fn process(self, client: &BaseClient) {
        let client = self.client(client);
        let options = self.options();

        let response = block_on(import_data_value_set_file(
            &client, &self.file, &options, None,
        ));

        evaluate_and_print_response(response.map(|outcome| outcome.into_payload()))
    }
}
