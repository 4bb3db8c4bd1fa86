//! Authentication-related CLI commands and profile management
//!
//! Profiles hold the URL and credentials of an instance and are stored in
//! the system keyring, so they can be selected with `--profile`.

use colored::Colorize;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use url::Url;

use crate::client::BaseClient;
use crate::config::Dhis2Config;

use super::base::{print_error, Matcher};

const KEYRING_SERVICE: &str = "dhis2cli";

/// Subcommands for handling authentication in the DHIS2 CLI
#[derive(StructOpt, Debug)]
#[structopt(about = "Handle authentication of the DHIS2 CLI")]
pub enum AuthSubCommand {
    /// Set an authentication profile with a name, URL and credentials
    #[structopt(about = "Set the authentication profile")]
    Set {
        #[structopt(short, long, help = "Name of the profile")]
        name: String,

        #[structopt(short, long, help = "URL of the DHIS2 instance")]
        url: String,

        #[structopt(long, help = "Username of the DHIS2 account")]
        username: String,

        #[structopt(
            long,
            env = "DHIS2_PASSWORD",
            hide_env_values = true,
            help = "Password of the DHIS2 account"
        )]
        password: String,
    },
}

impl Matcher for AuthSubCommand {
    fn process(self, _client: &BaseClient) {
        match self {
            AuthSubCommand::Set {
                name,
                url,
                username,
                password,
            } => {
                let profile = match AuthProfile::new(&name, &url, &username, &password) {
                    Ok(profile) => profile,
                    Err(e) => {
                        print_error(&format!("Failed to create profile: {e}"));
                        std::process::exit(exitcode::USAGE);
                    }
                };

                match profile.set_to_keyring() {
                    Ok(()) => {
                        println!(
                            "Profile '{}' saved. Use it with {}",
                            name.bold().green(),
                            format!("--profile {name}").dimmed().italic()
                        );
                    }
                    Err(e) => {
                        print_error(&format!("Failed to save profile to keyring: {e}"));
                        std::process::exit(exitcode::IOERR);
                    }
                }
            }
        }
    }
}

/// An authentication profile for the DHIS2 CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProfile {
    #[serde(skip)]
    name: String,
    url: String,
    username: String,
    password: String,
}

impl AuthProfile {
    /// Creates a new profile, validating the URL.
    pub fn new(name: &str, url: &str, username: &str, password: &str) -> Result<Self, String> {
        Url::parse(url).map_err(|_| "Invalid URL format".to_string())?;

        if username.trim().is_empty() {
            return Err("Username must not be empty".to_string());
        }

        Ok(AuthProfile {
            name: name.to_string(),
            url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Stores the profile in the system keyring, as JSON under the profile name.
    pub fn set_to_keyring(&self) -> Result<(), Box<dyn std::error::Error>> {
        let entry = Entry::new(KEYRING_SERVICE, &self.name)?;
        entry.set_password(&serde_json::to_string(self)?)?;
        Ok(())
    }

    pub fn get_from_keyring(name: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let entry = Entry::new(KEYRING_SERVICE, name)?;
        let stored = entry.get_password()?;

        let profile: AuthProfile = serde_json::from_str(&stored)?;
        Ok(AuthProfile {
            name: name.to_string(),
            ..profile
        })
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_url(&self) -> &str {
        &self.url
    }

    /// The client configuration of this profile.
    pub fn to_config(&self) -> Dhis2Config {
        Dhis2Config::with_basic_auth(&self.url, &self.username, &self.password)
    }
}
