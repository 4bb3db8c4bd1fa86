use std::error::Error;
use std::path::PathBuf;

use colored::Colorize;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use dhis2::cli::auth::{AuthProfile, AuthSubCommand};
use dhis2::cli::base::{print_error, Matcher};
use dhis2::cli::datastore::DataStoreSubCommand;
use dhis2::cli::import::ImportCommand;
use dhis2::cli::info::InfoSubCommand;
use dhis2::cli::metadata::MetadataSubCommand;
use dhis2::cli::tasks::TasksCommand;
use dhis2::client::BaseClient;
use dhis2::config::Dhis2Config;

static HEADER: &str = r#"
--- DHIS2 Command Line Interface ---
"#;

#[derive(StructOpt, Debug)]
struct GlobalOpts {
    /// Profile name to use for configuration
    #[structopt(short, long)]
    profile: Option<String>,

    /// Configuration file (TOML, JSON or YAML) to use instead of a profile
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
#[structopt(name = "dhis2cli", about = "CLI to interact with DHIS2")]
struct Cli {
    #[structopt(flatten)]
    global: GlobalOpts,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    Info(InfoSubCommand),
    Metadata(MetadataSubCommand),
    Datastore(DataStoreSubCommand),
    Import(ImportCommand),
    Tasks(TasksCommand),
    Auth(AuthSubCommand),
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::from_args();

    // Setting a profile does not talk to an instance.
    let client = match &cli.cmd {
        Command::Auth(_) => setup_placeholder_client()
            .unwrap_or_else(|e| exit_with(&e.to_string(), exitcode::SOFTWARE)),
        _ => {
            let client = setup_client(&cli.global).unwrap_or_else(|e| {
                exit_with(&format!("Failed to set up client: {e}"), exitcode::CONFIG)
            });

            if atty::is(atty::Stream::Stdout) {
                println!("{}", HEADER.bold());
            }

            client
        }
    };

    match cli.cmd {
        Command::Info(command) => command.process(&client),
        Command::Metadata(command) => command.process(&client),
        Command::Datastore(command) => command.process(&client),
        Command::Import(command) => command.process(&client),
        Command::Tasks(command) => command.process(&client),
        Command::Auth(command) => command.process(&client),
    }
}

fn exit_with(message: &str, code: i32) -> ! {
    print_error(message);
    std::process::exit(code);
}

// A profile takes precedence over a config file, which takes precedence
// over the DHIS2_* environment variables.
fn setup_client(global: &GlobalOpts) -> Result<BaseClient, Box<dyn Error>> {
    let config = match (&global.profile, &global.config) {
        (Some(profile), _) => AuthProfile::get_from_keyring(profile)?.to_config(),
        (None, Some(path)) => Dhis2Config::from_file(path)?,
        (None, None) => Dhis2Config::from_env()?,
    };

    Ok(BaseClient::new(config)?)
}

fn setup_placeholder_client() -> Result<BaseClient, Box<dyn Error>> {
    let config = Dhis2Config::with_basic_auth("https://None", "", "");
    Ok(BaseClient::new(config)?)
}
