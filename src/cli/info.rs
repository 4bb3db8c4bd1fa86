//! Information retrieval commands for DHIS2 instances

use structopt::StructOpt;

use crate::client::BaseClient;
use crate::native_api::system;

use super::base::{block_on, evaluate_and_print_response, Matcher};

/// Subcommands for retrieving DHIS2 instance information
#[derive(StructOpt, Debug)]
#[structopt(about = "Retrieve information about the DHIS2 instance")]
pub enum InfoSubCommand {
    #[structopt(about = "Retrieve the system info, including the version")]
    System,

    #[structopt(about = "Check whether the instance is reachable with the given credentials")]
    Status,

    #[structopt(about = "Retrieve the system settings")]
    Settings,

    #[structopt(about = "Check whether an object exists at a path, e.g. dataElements/<id>")]
    Exists { path: String },
}

impl Matcher for InfoSubCommand {
    fn process(self, client: &BaseClient) {
        match self {
            InfoSubCommand::System => {
                evaluate_and_print_response(block_on(system::get_system_info(client)))
            }
            InfoSubCommand::Status => {
                let status = block_on(system::get_status(client)).map(|status| {
                    serde_json::json!({
                        "status": status.as_u16(),
                        "reason": status.canonical_reason(),
                    })
                });
                evaluate_and_print_response(status)
            }
            InfoSubCommand::Settings => {
                evaluate_and_print_response(block_on(system::get_system_settings(client)))
            }
            InfoSubCommand::Exists { path } => {
                evaluate_and_print_response(block_on(system::object_exists(client, &path)))
            }
        }
    }
}
