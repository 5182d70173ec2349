mod config;
mod logging;

use clap::{Parser, Subcommand};
use config::{Config, ConfigError};
use event_api::EventApiRunError;
use event_api::client::{EventsClient, RawResponse};
use event_api::config::UpstreamConfig;
use event_api::errors::{ClientInitError, EventApiError};
use event_api::types::SearchQuery;
use hello::HelloError;
use logging::ObservabilityError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const API_KEY_ENV: &str = "CONNPASS_API_KEY";

#[derive(Parser)]
#[command(version, about = "connpass hands-on services")]
struct Cli {
    /// YAML config file. Built-in defaults are used when omitted.
    #[arg(long, short, global = true, env = "HANDSON_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum CliCommand {
    /// Serve the connpass event proxy
    EventApi,
    /// Serve the hello samples
    Hello,
    /// Query the upstream events API once and print the raw response
    TryConnpass {
        #[arg(long, default_value = "山梨県立図書館")]
        keyword: String,
        #[arg(long, default_value_t = 3)]
        count: i64,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Observability(#[from] ObservabilityError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("CONNPASS_API_KEY is not set")]
    MissingApiKey,
    #[error(transparent)]
    EventApi(#[from] EventApiRunError),
    #[error(transparent)]
    Hello(#[from] HelloError),
    #[error(transparent)]
    ClientInit(#[from] ClientInitError),
    #[error("エラーが発生しました: {0}")]
    Upstream(#[from] EventApiError),
    #[error("エラーが発生しました: {0}")]
    UpstreamStatus(String),
    #[error("could not format response: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    // Loaded before parsing so HANDSON_CONFIG and RUST_LOG can come from .env
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let _sentry = match logging::init_logging(&config.common.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = dotenv
        && !e.not_found()
    {
        tracing::warn!(error = %e, "Could not load .env file");
    }

    match run(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exiting");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

fn api_key() -> Result<String, CliError> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(CliError::MissingApiKey),
    }
}

fn run(command: CliCommand, config: Config) -> Result<(), CliError> {
    logging::init_metrics(config.common.metrics.as_ref())?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match command {
        CliCommand::EventApi => {
            let key = api_key()?;
            rt.block_on(event_api::run(config.event_api, &key))?;
        }
        CliCommand::Hello => {
            rt.block_on(hello::run(config.hello))?;
        }
        CliCommand::TryConnpass { keyword, count } => {
            let key = api_key()?;
            rt.block_on(try_connpass(&config.event_api.upstream, &key, keyword, count))?;
        }
    }

    Ok(())
}

async fn try_connpass(
    upstream: &UpstreamConfig,
    api_key: &str,
    keyword: String,
    count: i64,
) -> Result<(), CliError> {
    let client = EventsClient::new(upstream, api_key)?;
    let response = client.fetch_raw(&SearchQuery { keyword, count }).await?;

    println!("{}", render_response(&response)?);
    Ok(())
}

/// Pretty-prints a 200 payload. Any other status yields the upstream body as
/// the error, which `main` reports once.
fn render_response(response: &RawResponse) -> Result<String, CliError> {
    if !response.is_ok() {
        return Err(CliError::UpstreamStatus(response.body.clone()));
    }

    let data: serde_json::Value = serde_json::from_str(&response.body)?;
    Ok(serde_json::to_string_pretty(&data)?)
}
