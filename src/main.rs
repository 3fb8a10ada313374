// Copyright 2024 The DocAssert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use api_contexts::json_diff::path::JSONPath;
use api_contexts::{
    compare_with, parse_document, ApiContext, ArrayMode, Config, ContextConfig, ContextError,
    ReqwestBrowser,
};

#[doc(hidden)]
#[macro_export]
macro_rules! handle_error {
    ($code:expr, $msg:expr, $($arg:tt)*) => {
        println!($msg, $($arg)*);
        std::process::exit($code);
    };

    ($code:expr, $msg:expr) => {
        println!($msg);
        std::process::exit($code);
    };
}

#[doc(hidden)]
struct Code;

impl Code {
    const SUCCESS: i32 = 0;
    const INTERNAL_ERROR: i32 = 1;
    const INVALID_ARGUMENT: i32 = 2;
    const MALFORMED_INPUT: i32 = 3;
    const ASSERTION_ERROR: i32 = 4;

    fn of(err: &ContextError) -> i32 {
        match err {
            ContextError::MalformedInput(_) => Code::MALFORMED_INPUT,
            ContextError::AssertionMismatch(_) => Code::ASSERTION_ERROR,
            ContextError::Configuration(_) | ContextError::Regex(_) => Code::INVALID_ARGUMENT,
            ContextError::Adapter(_) | ContextError::Io(_) | ContextError::Http(_) => {
                Code::INTERNAL_ERROR
            }
        }
    }
}

#[doc(hidden)]
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Context configuration file (JSON or YAML)
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[doc(hidden)]
#[derive(Debug, Subcommand)]
enum Command {
    /// Compare two JSON documents regardless of array order
    Compare {
        /// Document under test
        actual: PathBuf,

        /// Reference document
        expected: PathBuf,

        /// Compare arrays element by element instead of rearranging them
        #[clap(long)]
        ordered_arrays: bool,

        /// JSONPath to leave out of the comparison, can be repeated
        #[clap(short, long)]
        ignore: Vec<String>,
    },
    /// Send a request and compare the JSON response with a fixture
    Request {
        /// URL to send the request to
        #[clap(short, long)]
        url: String,

        /// HTTP method
        #[clap(short, long, default_value = "GET")]
        method: String,

        /// Request fixture sent as body
        #[clap(short, long)]
        body_file: Option<String>,

        /// Header sent with the request, as `Name: value`
        #[clap(short = 'H', long)]
        header: Vec<String>,

        /// Response fixture the body must be equal to
        #[clap(short, long)]
        expected: String,

        /// Expected status code
        #[clap(short, long)]
        status: Option<u16>,

        /// JSONPath to leave out of the comparison, can be repeated
        #[clap(short, long)]
        ignore: Vec<String>,
    },
}

#[doc(hidden)]
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match ContextConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                handle_error!(Code::INVALID_ARGUMENT, "Error: {}", e);
            }
        },
        None => ContextConfig::new()
            .with_request_fixtures("")
            .with_response_fixtures(""),
    };

    let result = match cli.command {
        Command::Compare {
            actual,
            expected,
            ordered_arrays,
            ignore,
        } => compare_files(&actual, &expected, ordered_arrays, &ignore),
        Command::Request {
            url,
            method,
            body_file,
            header,
            expected,
            status,
            ignore,
        } => {
            let mut headers = Vec::with_capacity(header.len());
            for header in header.iter() {
                match parse_header(header) {
                    Ok(parsed) => headers.push(parsed),
                    Err(e) => {
                        handle_error!(Code::of(&e), "Error: {}", e);
                    }
                }
            }

            let mut api = ApiContext::new(ReqwestBrowser::new(""), &config);
            for (name, value) in headers.iter() {
                api.set_header(name, value);
            }
            send_request(&mut api, &url, &method, body_file.as_deref(), &expected, status, &ignore)
                .await
        }
    };

    match result {
        Ok(()) => {
            println!("Documents match.");
            std::process::exit(Code::SUCCESS);
        }
        Err(err) => {
            handle_error!(Code::of(&err), "{}", err);
        }
    }
}

fn parse_header(header: &str) -> api_contexts::Result<(String, String)> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ContextError::Configuration(format!(
            "Invalid header {}",
            header
        ))),
    }
}

fn compare_files(
    actual: &Path,
    expected: &Path,
    ordered_arrays: bool,
    ignore: &[String],
) -> api_contexts::Result<()> {
    let actual = parse_document(
        &fs::read_to_string(actual)?,
        &format!("{} is not a valid Json document.", actual.display()),
    )?;
    let expected = parse_document(
        &fs::read_to_string(expected)?,
        &format!("{} is not a valid Json document.", expected.display()),
    )?;

    let array_mode = if ordered_arrays {
        ArrayMode::Ordered
    } else {
        ArrayMode::Rearrange
    };
    let mut config = Config::new().array_mode(array_mode);
    for path in ignore {
        config = config.ignore_path(path.as_str().jsonpath()?);
    }

    let report = compare_with(&actual, &expected, &config);
    if report.is_empty() {
        Ok(())
    } else {
        Err(ContextError::AssertionMismatch(format!(
            "Json don't match.\n{}",
            report
        )))
    }
}

async fn send_request(
    api: &mut ApiContext<ReqwestBrowser>,
    url: &str,
    method: &str,
    body_file: Option<&str>,
    expected: &str,
    status: Option<u16>,
    ignore: &[String],
) -> api_contexts::Result<()> {
    match body_file {
        Some(body_file) => {
            api.send_request_with_body_from_file(method, url, body_file)
                .await?
        }
        None => api.send_request(method, url, None).await?,
    }

    if let Some(status) = status {
        api.response_status_should_be(status)?;
    }

    let ignore = ignore.iter().map(String::as_str).collect::<Vec<_>>();
    api.json_response_should_be_equal_to_file_ignoring(expected, &ignore)
}
