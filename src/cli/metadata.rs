//! Metadata commands, driven by the resource descriptors of the library

use serde_json::Value;
use structopt::StructOpt;

use crate::client::BaseClient;
use crate::error::Error;
use crate::native_api::metadata::{self, find_resource, Resource, RESOURCES};
use crate::query_api::query::{Filter, Order, Query};

use super::base::{block_on, evaluate_and_print_response, Matcher};

#[derive(StructOpt, Debug)]
pub struct ListArgs {
    #[structopt(help = "Resource to list, e.g. dataElements")]
    resource: String,

    #[structopt(
        short,
        long,
        number_of_values = 1,
        help = "Filter as property:operator:value, may be repeated"
    )]
    filter: Vec<Filter>,

    #[structopt(long, help = "Page to retrieve")]
    page: Option<u32>,

    #[structopt(long, help = "Number of objects per page")]
    page_size: Option<u32>,

    #[structopt(long, help = "Retrieve all objects in one response")]
    no_paging: bool,

    #[structopt(short, long, help = "Order as property:asc or property:desc")]
    order: Option<Order>,

    #[structopt(short, long, help = "Expand associated objects")]
    expand: bool,
}

impl ListArgs {
    fn to_query(&self) -> Query {
        let mut query = self
            .filter
            .iter()
            .cloned()
            .fold(Query::new(), |query, filter| query.filter(filter));

        if self.no_paging {
            query = query.without_paging();
        } else {
            if let Some(page) = self.page {
                query = query.page(page);
            }
            if let Some(page_size) = self.page_size {
                query = query.page_size(page_size);
            }
        }

        if let Some(order) = &self.order {
            query = query.order(order.clone());
        }

        query.expand_associations(self.expand)
    }
}

/// Subcommands for reading metadata
#[derive(StructOpt, Debug)]
#[structopt(about = "Read metadata of the DHIS2 instance")]
pub enum MetadataSubCommand {
    #[structopt(about = "List objects of a resource")]
    List(ListArgs),

    #[structopt(about = "Retrieve a single object")]
    Get {
        #[structopt(help = "Resource of the object, e.g. dataElements")]
        resource: String,

        #[structopt(help = "Identifier of the object")]
        id: String,
    },

    #[structopt(about = "Print the resources known to the CLI")]
    Resources,
}

fn resource(path: &str) -> Result<&'static Resource, Error> {
    find_resource(path).ok_or_else(|| {
        let known: Vec<&str> = RESOURCES.iter().map(|r| r.path).collect();
        Error::Config(format!(
            "Unknown resource '{path}', expected one of: {}",
            known.join(", ")
        ))
    })
}

impl Matcher for MetadataSubCommand {
    fn process(self, client: &BaseClient) {
        match self {
            MetadataSubCommand::List(args) => {
                let response = block_on(async {
                    let resource = resource(&args.resource)?;
                    metadata::list_objects::<Value>(client, resource, &args.to_query()).await
                });
                evaluate_and_print_response(response)
            }
            MetadataSubCommand::Get { resource: path, id } => {
                let response = block_on(async {
                    let resource = resource(&path)?;
                    metadata::get_object::<Value>(client, resource, &id).await
                });
                evaluate_and_print_response(response)
            }
            MetadataSubCommand::Resources => {
                let paths: Vec<&str> = RESOURCES.iter().map(|r| r.path).collect();
                evaluate_and_print_response(Ok::<_, Error>(paths))
            }
        }
    }
}
