use std::path::PathBuf;

use serde_json::Value;
use structopt::StructOpt;

use crate::client::BaseClient;
use crate::native_api::datastore;

use super::base::{block_on, evaluate_and_print_response, parse_file, print_error, Matcher};

/// Subcommands for the key/value data store
#[derive(StructOpt, Debug)]
#[structopt(about = "Handle entries of the DHIS2 data store")]
pub enum DataStoreSubCommand {
    #[structopt(about = "List all namespaces")]
    Namespaces,

    #[structopt(about = "List the keys of a namespace")]
    Keys { namespace: String },

    #[structopt(about = "Retrieve the value of an entry")]
    Get { namespace: String, key: String },

    #[structopt(about = "Retrieve the metadata of an entry")]
    Meta { namespace: String, key: String },

    #[structopt(about = "Create or replace an entry with the content of a JSON/YAML file")]
    Set {
        namespace: String,
        key: String,

        #[structopt(short, long, help = "Path to the JSON/YAML file holding the value")]
        file: PathBuf,

        #[structopt(long, help = "Replace an existing entry instead of creating one")]
        update: bool,
    },

    #[structopt(about = "Remove an entry, or the whole namespace when no key is given")]
    Remove {
        namespace: String,
        key: Option<String>,
    },
}

impl Matcher for DataStoreSubCommand {
    fn process(self, client: &BaseClient) {
        match self {
            DataStoreSubCommand::Namespaces => {
                evaluate_and_print_response(block_on(datastore::get_namespaces(client)))
            }
            DataStoreSubCommand::Keys { namespace } => {
                evaluate_and_print_response(block_on(datastore::get_keys(client, &namespace)))
            }
            DataStoreSubCommand::Get { namespace, key } => evaluate_and_print_response(block_on(
                datastore::get_entry::<Value>(client, &namespace, &key),
            )),
            DataStoreSubCommand::Meta { namespace, key } => evaluate_and_print_response(
                block_on(datastore::get_entry_metadata(client, &namespace, &key)),
            ),
            DataStoreSubCommand::Set {
                namespace,
                key,
                file,
                update,
            } => {
                let value: Value = match parse_file(&file) {
                    Ok(value) => value,
                    Err(e) => {
                        print_error(&format!("Failed to read {}: {e}", file.display()));
                        std::process::exit(exitcode::NOINPUT);
                    }
                };

                let response = if update {
                    block_on(datastore::update_entry(client, &namespace, &key, &value))
                } else {
                    block_on(datastore::save_entry(client, &namespace, &key, &value))
                };

                evaluate_and_print_response(response)
            }
            DataStoreSubCommand::Remove { namespace, key } => {
                let response = match key {
                    Some(key) => block_on(datastore::remove_entry(client, &namespace, &key)),
                    None => block_on(datastore::remove_namespace(client, &namespace)),
                };
                evaluate_and_print_response(response)
            }
        }
    }
}
