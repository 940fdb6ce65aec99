//! CLI binary for the wa-plugins crate.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use wa_plugins::{
    AwsMeta, ConfigError, JobOutput, LocalShell, LogcatRegexConfig, MetadataClient,
    MetadataError, Platform, DEFAULT_TOKEN_TTL, LOGCAT_ARTIFACT,
};

#[derive(Parser)]
#[command(name = "wa-plugins")]
#[command(
    author,
    version,
    about = "Collect instance metadata and extract logcat metrics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect the AWS instance metadata tree
    AwsMeta {
        /// Metadata service base URL
        #[arg(long, default_value = "http://169.254.169.254")]
        base_url: String,

        /// Treat this host as the given AWS instance
        #[arg(long)]
        instance_id: Option<String>,

        /// Query the metadata service over HTTP instead of through curl
        /// (only used together with --instance-id)
        #[arg(long)]
        direct: bool,

        /// Session token TTL in seconds
        #[arg(long, default_value_t = DEFAULT_TOKEN_TTL)]
        token_ttl: u64,

        /// Abort a curl command after this many seconds
        #[arg(long)]
        command_timeout: Option<u64>,
    },

    /// Extract metrics from a logcat file
    LogcatRegex {
        /// Logcat file to scan
        logcat: PathBuf,

        /// Regex with "key" and "value" named groups (repeatable)
        #[arg(short, long = "regex")]
        regexes: Vec<String>,

        /// JSON file with a "regexes" field (string or list)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::AwsMeta {
            base_url,
            instance_id,
            direct,
            token_ttl,
            command_timeout,
        } => {
            let platform = match instance_id {
                Some(instance_id) => Platform::Aws { instance_id },
                None => Platform::Generic,
            };
            let target = match command_timeout {
                Some(secs) => LocalShell::new(platform).with_timeout(Duration::from_secs(secs)),
                None => LocalShell::new(platform),
            };

            let mut meta = AwsMeta::with_base_url(&base_url).with_token_ttl(token_ttl);
            if direct {
                let client = MetadataClient::with_base_url(&base_url)?.with_token_ttl(token_ttl);
                meta = meta.with_direct_client(client);
            }

            let mut context = Map::<String, Value>::new();
            meta.initialize(&target, &mut context).await?;
            println!("{}", serde_json::to_string_pretty(&context)?);
            Ok(())
        }

        Commands::LogcatRegex {
            logcat,
            regexes,
            config,
        } => {
            let mut settings = match config {
                Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
                None => LogcatRegexConfig::default(),
            };
            settings.regexes.extend(regexes);
            let extractor = settings.validate()?;

            let mut output = JobOutput::new(std::env::current_dir()?);
            output.add_artifact(LOGCAT_ARTIFACT, logcat);
            extractor.process_job_output(&mut output)?;

            println!("{}", serde_json::to_string_pretty(output.metrics())?);
            Ok(())
        }
    }
}
