use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use segment_provider::config::Config;
use segment_provider::resource::{self, dispatch, Diagnostic, ProviderError};
use segment_provider::segment::{format_api_error, SegmentClient};
use segment_provider::VERSION;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Exit code when a Read or Import target does not exist
const EXIT_NOT_FOUND: u8 = 2;

/// Manage Segment resources from an infrastructure-as-code host
#[derive(Parser, Debug)]
#[command(name = "segment-provider", version = VERSION, about, long_about = None)]
struct Args {
    /// Segment public API token
    #[arg(long)]
    token: Option<String>,

    /// Segment public API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

/// State and configuration arguments take a JSON or YAML file, or `-` for stdin
#[derive(Subcommand, Debug)]
enum Command {
    /// Print resource and data source schemas
    Schema {
        /// Only print this type
        type_name: Option<String>,
    },
    /// Check a configuration against its schema
    Validate { type_name: String, config: String },
    /// Show which attributes differ and which force replacement
    Plan {
        type_name: String,
        prior: String,
        planned: String,
    },
    /// Create a resource and print its state
    Create { type_name: String, planned: String },
    /// Refresh a resource and print its state
    Read { type_name: String, state: String },
    /// Apply planned changes to a resource
    Update {
        type_name: String,
        prior: String,
        planned: String,
    },
    /// Delete a resource
    Delete { type_name: String, state: String },
    /// Build state for an existing resource from its ID
    Import { type_name: String, id: String },
    /// Read a data source
    Data { type_name: String, config: String },
    /// Show the workspace the token belongs to
    Workspace,
    /// Persist --token and --api-url to the config file
    Configure,
}

impl Command {
    /// Commands whose missing target gets its own exit code
    fn is_lookup(&self) -> bool {
        matches!(self, Command::Read { .. } | Command::Import { .. })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("segment-provider {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("segment-provider").join("segment-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".segment-provider").join("segment-provider.log");
    }
    PathBuf::from("segment-provider.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);
    let is_lookup = args.command.is_lookup();

    match run(args).await {
        Ok(code) => code,
        Err(err) => report(&err, is_lookup),
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = Config::load();

    match &args.command {
        Command::Schema { type_name } => {
            match type_name {
                Some(type_name) => {
                    let schema = resource::get_resource(type_name)
                        .or_else(|| resource::get_data_source(type_name))
                        .ok_or_else(|| ProviderError::UnknownResourceType(type_name.clone()))?;
                    print_json(schema)?;
                }
                None => print_json(resource::get_registry())?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { type_name, config: input } => {
            let document = read_document(input)?;
            let diagnostics = dispatch::validate(type_name, &document)?;
            print_json(&diagnostics)?;
            if diagnostics.iter().any(Diagnostic::is_error) {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::Plan {
            type_name,
            prior,
            planned,
        } => {
            let (prior, planned) = read_pair(prior, planned)?;
            print_json(&dispatch::plan(type_name, &prior, &planned)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Create { type_name, planned } => {
            let client = build_client(&args, &config)?;
            let planned = read_document(planned)?;
            print_json(&dispatch::create(&client, type_name, &planned).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Read { type_name, state } => {
            let client = build_client(&args, &config)?;
            let state = read_document(state)?;
            print_json(&dispatch::read(&client, type_name, &state).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Update {
            type_name,
            prior,
            planned,
        } => {
            let client = build_client(&args, &config)?;
            let (prior, planned) = read_pair(prior, planned)?;
            print_json(&dispatch::update(&client, type_name, &prior, &planned).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Delete { type_name, state } => {
            let client = build_client(&args, &config)?;
            let state = read_document(state)?;
            dispatch::delete(&client, type_name, &state).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Import { type_name, id } => {
            let client = build_client(&args, &config)?;
            print_json(&dispatch::import(&client, type_name, id).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Data { type_name, config: input } => {
            let client = build_client(&args, &config)?;
            let document = read_document(input)?;
            print_json(&dispatch::read_data_source(&client, type_name, &document).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Workspace => {
            let client = build_client(&args, &config)?;
            print_json(&client.workspace().await.map_err(ProviderError::from)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Configure => {
            if args.token.is_none() && args.api_url.is_none() {
                anyhow::bail!("Nothing to configure. Pass --token and/or --api-url");
            }

            let mut updated = config;
            if let Some(token) = &args.token {
                updated.token = Some(token.clone());
            }
            if let Some(api_url) = &args.api_url {
                updated.api_url = Some(api_url.clone());
            }
            let path = updated.save()?;
            eprintln!("Saved configuration to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_client(args: &Args, config: &Config) -> Result<SegmentClient> {
    let token = config.effective_token(args.token.as_deref()).context(
        "No Segment API token configured. Set SEGMENT_API_TOKEN, use --token, or run configure",
    )?;
    let api_url = config.effective_api_url(args.api_url.as_deref());
    tracing::info!("Using API: {}", api_url);

    SegmentClient::new(&api_url, &token).map_err(|e| ProviderError::from(e).into())
}

/// Parse a JSON or YAML document from a file, or stdin for `-`
fn read_document(source: &str) -> Result<Value> {
    let content = if source == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        content
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", source))
}

fn read_pair(prior: &str, planned: &str) -> Result<(Value, Value)> {
    if prior == "-" && planned == "-" {
        anyhow::bail!("Only one of prior and planned state can be read from stdin");
    }
    Ok((read_document(prior)?, read_document(planned)?))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print diagnostics to stderr and pick the exit code
fn report(err: &anyhow::Error, is_lookup: bool) -> ExitCode {
    let Some(provider_error) = err.downcast_ref::<ProviderError>() else {
        eprintln!("Error: {err:#}");
        return ExitCode::FAILURE;
    };

    tracing::error!("{}", provider_error);
    if let ProviderError::Api(api_error) = provider_error {
        eprintln!("Error: {}", format_api_error(api_error));
    }

    match serde_json::to_string_pretty(&provider_error.to_diagnostics()) {
        Ok(diagnostics) => eprintln!("{}", diagnostics),
        Err(_) => eprintln!("Error: {}", provider_error),
    }

    if is_lookup && provider_error.is_not_found() {
        ExitCode::from(EXIT_NOT_FOUND)
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    fn missing_source() -> anyhow::Error {
        ProviderError::NotFound {
            resource: "segment_source",
            id: "s1".to_string(),
        }
        .into()
    }

    #[test]
    fn test_lookup_commands() {
        assert!(parse(&["segment-provider", "read", "segment_source", "state.json"]).command.is_lookup());
        assert!(parse(&["segment-provider", "import", "segment_source", "s1"]).command.is_lookup());
        assert!(!parse(&["segment-provider", "delete", "segment_source", "state.json"]).command.is_lookup());
        assert!(!parse(&["segment-provider", "update", "segment_source", "a.json", "b.json"]).command.is_lookup());
    }

    #[test]
    fn test_not_found_exit_code_only_for_lookups() {
        assert_eq!(report(&missing_source(), true), ExitCode::from(EXIT_NOT_FOUND));
        assert_eq!(report(&missing_source(), false), ExitCode::FAILURE);
        assert_eq!(report(&anyhow::anyhow!("bad input"), true), ExitCode::FAILURE);
    }
}
