use serde_json::Value;
use structopt::StructOpt;

use crate::client::BaseClient;
use crate::jobs::model::{JobCategory, JobReference};
use crate::native_api::jobs;

use super::base::{block_on, evaluate_and_print_response, Matcher};

/// Inspect server-side jobs
#[derive(StructOpt, Debug)]
#[structopt(about = "Inspect jobs of the DHIS2 instance")]
pub struct TasksCommand {
    #[structopt(help = "Job category, e.g. DATAVALUE_IMPORT")]
    category: JobCategory,

    #[structopt(help = "Identifier of the job")]
    id: String,

    #[structopt(short, long, help = "Print the task summary instead of the notifications")]
    summary: bool,
}

impl Matcher for TasksCommand {
    fn process(self, client: &BaseClient) {
        let reference = JobReference::new(self.category, &self.id);

        if self.summary {
            evaluate_and_print_response(block_on(jobs::get_task_summary::<Value>(
                client, &reference,
            )))
        } else {
            evaluate_and_print_response(block_on(jobs::get_job_notifications(client, &reference)))
        }
    }
}
