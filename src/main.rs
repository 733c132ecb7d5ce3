use std::{fs::File, io, path::PathBuf, process, sync::Mutex, time::Duration};

use clap::Parser;
use thiserror::Error;
use tokio::{runtime::Runtime, task::JoinError};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lolrotation::{
    config::Config,
    model::ids::SessionKey,
    service::{
        api::{
            http_client::HttpClientError,
            rotation_repository::{CurrentRotationError, RotationRepository, RotationSource, DEFAULT_BASE_URL},
        },
        rotation_store::{LoadState, RotationStore},
    },
    ui::{
        repl,
        views::rotation::{plain_text, LOAD_FAILED_MESSAGE},
        ReplError,
    },
};

/// Current League of Legends free champion rotation
#[derive(Parser, Debug)]
#[command(name = "lolrotation")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the rotation backend
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Session key sent with every request, a random one is generated if omitted
    #[arg(long)]
    session_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout", default_value_t = 90)]
    timeout_secs: u64,

    /// Print the rotation once instead of opening the interactive view
    #[arg(short = 'p', long = "print")]
    print: bool,

    /// Initial search query for champion names
    #[arg(short = 's', long = "search", default_value = "")]
    search: String,

    /// Write logs to this file (the interactive view logs nothing otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            base_url: args.base_url,
            session_key: args.session_key.map(SessionKey::from).unwrap_or_else(SessionKey::random),
            request_timeout: Duration::from_secs(args.timeout_secs),
            initial_query: args.search,
            print_only: args.print,
            log_file: args.log_file,
        }
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] HttpClientError),
    #[error("Error occured while running REPL: {0}")]
    Repl(#[from] ReplError),
    #[error("Rotation request did not complete: {0}")]
    Task(#[from] JoinError),
    #[error("{0}")]
    Rotation(#[from] CurrentRotationError),
    #[error("Rotation load ended in unexpected state '{0}'")]
    UnexpectedState(&'static str),
}

fn main() {
    let config = Config::from(Args::parse());

    if let Err(error) = init_logging(&config) {
        eprintln!("Could not set up logging: {}", error);
    }

    if let Err(error) = run(config) {
        eprintln!("{}", error);
        process::exit(1);
    }
}

fn init_logging(config: &Config) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match (&config.log_file, config.print_only) {
        (Some(path), _) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        (None, true) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        // Anything written to the terminal would tear the interactive view
        (None, false) => {}
    }

    Ok(())
}

fn run(config: Config) -> Result<(), AppError> {
    let runtime = Runtime::new()?;
    let repository = RotationRepository::from_config(&config)?;
    info!(url = repository.url(), session_key = %repository.session_key(), "starting");

    let store = RotationStore::new(repository, runtime.handle().clone());

    if config.print_only {
        return print_rotation(&runtime, &store, &config.initial_query);
    }

    repl::run(&store, &config.initial_query)?;
    Ok(())
}

fn print_rotation<S: RotationSource + 'static>(
    runtime: &Runtime,
    store: &RotationStore<S>,
    query: &str,
) -> Result<(), AppError> {
    if let Some(handle) = store.load() {
        runtime.block_on(handle)?;
    }

    match store.state() {
        LoadState::Data(rotation) => {
            println!("{}", plain_text(&rotation, query));
            Ok(())
        }
        LoadState::Error(error) => {
            eprintln!("{}", LOAD_FAILED_MESSAGE);
            Err(error.into())
        }
        other => Err(AppError::UnexpectedState(other.label())),
    }
}
