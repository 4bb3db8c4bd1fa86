//! Base functionality for the DHIS2 CLI
//!
//! This module provides core utilities and traits used across the CLI including:
//! - Response handling and printing
//! - File parsing for JSON/YAML payloads
//! - The trait every subcommand implements

use std::fs;
use std::future::Future;
use std::path::Path;

use atty::Stream;
use colored::Colorize;
use colored_json::ToColoredJson;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::BaseClient;
use crate::error::Error;

/// Evaluates an API result, prints it and exits the process.
///
/// Successful results are printed as JSON, colored when stdout is a
/// terminal. Errors are printed in red and mapped to an exit code.
pub fn evaluate_and_print_response<T: Serialize>(response: Result<T, Error>) {
    match response {
        Ok(data) => match serde_json::to_string_pretty(&data) {
            Ok(json) => {
                redirect_stream(&json);
                std::process::exit(exitcode::OK);
            }
            Err(e) => {
                print_error(&e.to_string());
                std::process::exit(exitcode::SOFTWARE);
            }
        },
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(exit_code(&e));
        }
    }
}

/// Prints an error message to stderr.
pub fn print_error(message: &str) {
    eprintln!("\n{} {}\n", "Error:".red().bold(), message);
}

/// Maps an error to the exit code of the process.
pub fn exit_code(error: &Error) -> i32 {
    match error {
        Error::Transport(_) | Error::Timeout { .. } => exitcode::UNAVAILABLE,
        Error::Authentication { .. } => exitcode::NOPERM,
        Error::NotFound { .. } | Error::Http { .. } | Error::Decode { .. } => exitcode::DATAERR,
        Error::Server { .. } | Error::Encode(_) => exitcode::SOFTWARE,
        Error::Config(_) | Error::Url(_) => exitcode::CONFIG,
        Error::Io(_) => exitcode::IOERR,
    }
}

/// If users are redirecting the output to a file, only the JSON is printed
/// so that the output can be used in other scripts.
fn redirect_stream(json_str: &str) {
    if atty::is(Stream::Stdout) {
        println!("{}", success_message());
        match json_str.to_colored_json_auto() {
            Ok(colored) => println!("{colored}\n"),
            Err(_) => println!("{json_str}\n"),
        }
    } else {
        println!("{json_str}");
    }
}

fn success_message() -> String {
    format!(
        "{} {} - Received the following response: \n",
        "└── ".bold(),
        "Success!".green().bold()
    )
}

/// Runs `future` to completion on a fresh runtime.
pub fn block_on<F: Future>(future: F) -> F::Output {
    match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime.block_on(future),
        Err(e) => {
            print_error(&format!("Failed to start the async runtime: {e}"));
            std::process::exit(exitcode::OSERR);
        }
    }
}

/// Parses a JSON or YAML file into the specified type
///
/// # Arguments
/// * `path` - Path to the file to parse
///
/// # Type Parameters
/// * `P` - The path-like type for the file path
/// * `T` - The target type to deserialize into
pub fn parse_file<P, T>(path: P) -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let content = fs::read_to_string(path)?;

    if let Ok(content) = serde_json::from_str(&content) {
        Ok(content)
    } else if let Ok(content) = serde_yaml::from_str(&content) {
        Ok(content)
    } else {
        Err("Failed to parse the file as either JSON or YAML".into())
    }
}

/// Trait for processing CLI subcommands
///
/// Implementors define how to handle their specific subcommand variant
/// using the provided API client.
pub trait Matcher {
    /// Process this subcommand using the given client
    fn process(self, client: &BaseClient);
}
