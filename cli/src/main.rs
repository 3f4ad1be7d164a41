use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;
use stubhub_core::{ApiError, ClientConfig, GrantType, SearchParams, SearchSurface, StubhubClient};
use tracing_subscriber::EnvFilter;

/// Run one StubHub search and print every page merged as JSON.
#[derive(Parser, Debug)]
#[command(name = "stubbie")]
#[command(version)]
#[command(about = "Search StubHub locations, events or venues")]
struct Cli {
    /// Which search to run: locations, events or venues.
    #[arg(long, default_value = "locations")]
    surface: SearchSurface,

    /// Query parameter as NAME=VALUE. Repeatable. Defaults to q=London.
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// OAuth grant: client-credentials or password.
    #[arg(long)]
    grant: Option<GrantType>,

    /// Scope sent with the password grant.
    #[arg(long)]
    scope: Option<String>,

    /// API base URL (overrides STUBHUB_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,

    /// Directory holding consumer.key, consumer.secret, username, password.
    #[arg(long)]
    secrets_dir: Option<PathBuf>,

    /// base64("consumer_key:consumer_secret"), skipping the secret files.
    #[arg(long)]
    basic_token: Option<String>,

    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got {raw:?}")),
    }
}

impl Cli {
    /// Flags over environment over defaults.
    fn config(&self) -> Result<ClientConfig, ApiError> {
        let mut config = ClientConfig::from_env()?;
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(grant) = self.grant {
            config = config.with_grant_type(grant);
        }
        if let Some(scope) = &self.scope {
            config = config.with_scope(scope.clone());
        }
        if let Some(dir) = &self.secrets_dir {
            config.credentials.secrets_dir = dir.clone();
        }
        if self.basic_token.is_some() {
            config.credentials.basic_token = self.basic_token.clone();
        }
        if self.username.is_some() {
            config.credentials.username = self.username.clone();
        }
        if self.password.is_some() {
            config.credentials.password = self.password.clone();
        }
        Ok(config)
    }

    fn search_params(&self) -> SearchParams {
        if self.params.is_empty() {
            return SearchParams::new().with("q", "London");
        }
        self.params.iter().cloned().collect()
    }
}

fn run(cli: &Cli) -> Result<(), ApiError> {
    let mut client = StubhubClient::connect(cli.config()?)?;
    let result = client.search(cli.surface, cli.search_params())?;

    let json = serde_json::to_string_pretty(&Value::Object(result))
        .map_err(|e| ApiError::SerializationError(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("stubhub_core=info,stubbie=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(surface = %cli.surface, "Search failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
