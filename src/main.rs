use clap::Parser;
use lendbook::args::{Args, Command};
use lendbook::context::Context;
use lendbook::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    if let Command::Init(init_args) = args.command() {
        commands::init(home, init_args.api_url()).await?.print();
        return Ok(());
    }

    // When LENDBOOK_IN_TEST_MODE is set and non-empty, requests are answered by an in-memory
    // server seeded with sample data instead of the configured API.
    let mode = Mode::from_env();
    let config = Config::load(home).await?;
    let ctx = Context::new(config, mode).await?;

    match args.command() {
        Command::Console => commands::console(&ctx).await,
        command => commands::run(&ctx, command).await,
    }
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
