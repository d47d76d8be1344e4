use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use cli::handlers;
use qadesk::config::Config;
use qadesk::storage::FileStore;
use qadesk::store::DomainStore;

fn setup_logging(level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("qadesk")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("qadesk.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let mut builder = env_logger::Builder::new();
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.storage.data_dir.clone());
    let backend = FileStore::new(&data_dir).context(format!("Failed to open data directory {}", data_dir.display()))?;
    let mut store = DomainStore::open(backend);
    let verbose = cli.is_verbose();

    match cli.command {
        Commands::Suite { command } => handlers::handle_suite_command(&mut store, command, verbose),
        Commands::Case { command } => handlers::handle_case_command(&mut store, command, verbose),
        Commands::User { command } => handlers::handle_user_command(&mut store, command),
        Commands::Run {
            case,
            role,
            executor,
            verdicts,
            status,
        } => handlers::handle_run_command(&mut store, &case, role, executor, &verdicts, status),
        Commands::Open { locator } => handlers::handle_open_command(&store, &locator),
        Commands::Chat { message } => handlers::handle_chat_command(&mut store, config, &message, verbose),
        Commands::Summary { role, suite } => handlers::handle_summary_command(&store, role, suite.as_deref()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(cli, &config).context("Application failed")?;

    Ok(())
}
