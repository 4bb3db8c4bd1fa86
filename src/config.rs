//! Connection and polling configuration.
//!
//! A [`Dhis2Config`] can be built in code, read from the environment or
//! parsed from a TOML, JSON or YAML file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use url::Url;

use crate::error::{Error, Result};

/// Credentials injected into every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Authentication {
    /// HTTP Basic authentication with a DHIS2 account.
    Basic { username: String, password: String },
    /// An existing session, sent as the `JSESSIONID` cookie.
    Cookie { session_id: String },
}

/// Timing of the submit-then-poll flow used for asynchronous imports.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between two notification polls.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "interval_secs", default = "default_interval")]
    pub interval: Duration,

    /// Wall-clock budget for polling, measured from the first poll schedule.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "timeout_secs", default = "default_timeout")]
    pub timeout: Duration,

    /// Consecutive transient poll failures tolerated before giving up.
    #[serde(rename = "max_retries", default = "default_retries")]
    pub max_poll_retries: u32,
}

fn default_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_retries() -> u32 {
    3
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            timeout: default_timeout(),
            max_poll_retries: default_retries(),
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            ..Default::default()
        }
    }

    pub fn with_max_poll_retries(mut self, retries: u32) -> Self {
        self.max_poll_retries = retries;
        self
    }
}

/// Configuration of a DHIS2 instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dhis2Config {
    /// Base URL of the instance, without the `/api` part.
    url: String,
    authentication: Authentication,
    #[serde(default)]
    poll: PollConfig,
}

impl Dhis2Config {
    pub fn new(url: &str, authentication: Authentication) -> Self {
        Self {
            url: normalize_url(url),
            authentication,
            poll: PollConfig::default(),
        }
    }

    pub fn with_basic_auth(url: &str, username: &str, password: &str) -> Self {
        Self::new(
            url,
            Authentication::Basic {
                username: username.to_owned(),
                password: password.to_owned(),
            },
        )
    }

    pub fn with_cookie_auth(url: &str, session_id: &str) -> Self {
        Self::new(
            url,
            Authentication::Cookie {
                session_id: session_id.to_owned(),
            },
        )
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Reads the configuration from `DHIS2_*` environment variables.
    ///
    /// `DHIS2_URL` is required. A `DHIS2_SESSION_ID` selects cookie
    /// authentication, otherwise `DHIS2_USERNAME` and `DHIS2_PASSWORD` are
    /// required. Poll timing can be tuned with `DHIS2_POLL_INTERVAL_SECS`,
    /// `DHIS2_POLL_TIMEOUT_SECS` and `DHIS2_POLL_RETRIES`.
    pub fn from_env() -> Result<Self> {
        let url = require_env("DHIS2_URL")?;

        let authentication = match std::env::var("DHIS2_SESSION_ID") {
            Ok(session_id) => Authentication::Cookie { session_id },
            Err(_) => Authentication::Basic {
                username: require_env("DHIS2_USERNAME")?,
                password: require_env("DHIS2_PASSWORD")?,
            },
        };

        let mut poll = PollConfig::default();
        if let Some(secs) = parse_env::<u64>("DHIS2_POLL_INTERVAL_SECS")? {
            poll.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env::<u64>("DHIS2_POLL_TIMEOUT_SECS")? {
            poll.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_env::<u32>("DHIS2_POLL_RETRIES")? {
            poll.max_poll_retries = retries;
        }

        Ok(Self::new(&url, authentication).with_poll_config(poll))
    }

    /// Parses a configuration file. The format is picked from the extension
    /// (`toml`, `json`, `yaml`/`yml`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: Dhis2Config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| Error::decode(format!("invalid config {}", path.display()), e))?,
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?
            }
            _ => {
                return Err(Error::Config(format!(
                    "Unsupported config format: {}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            url: normalize_url(&config.url),
            ..config
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn authentication(&self) -> &Authentication {
        &self.authentication
    }

    pub fn poll(&self) -> &PollConfig {
        &self.poll
    }

    /// Resolves `path` against the instance API root, `<url>/api/<path>`.
    pub fn resolved_url(&self, path: &str) -> Result<Url> {
        let url = format!("{}/api/{}", self.url, path.trim_start_matches('/'));
        Ok(Url::parse(&url)?)
    }
}

fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| Error::Config(format!("{key} must be set")))
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key} has an invalid value: {value}"))),
        Err(_) => Ok(None),
    }
}
