use anyhow::Result;
use clap::Parser;
use log::{ debug, info };

use wfomc_sweep::FileCheckpointStore;

mod cli;
use cli::{ commands, SweepCli, Commands };

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the command line arguments
    let cli = SweepCli::parse();

    // Setup logging
    setup_logging(&cli.log_level);

    // Environment overrides may live in a .env file
    if let Err(e) = dotenv::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let mut config = commands::load_config(cli.config.as_deref(), cli.output_dir.as_ref())?;
    if let Some(path) = &cli.config {
        cli::ui::print_info(&format!("Loaded configuration from {}", path.display()));
    }

    match &cli.command {
        Commands::Run { workers, max_n, policy, timeout, properties, oracle } => {
            if let Some(workers) = workers {
                config.workers = *workers;
            }
            if max_n.is_some() {
                config.max_n = *max_n;
            }
            if let Some(policy) = policy {
                config.policy = *policy;
            }
            if timeout.is_some() {
                config.unit_timeout_secs = *timeout;
            }
            if !properties.is_empty() {
                config.properties = Some(properties.clone());
            }
            commands::apply_oracle_args(&mut config, oracle);

            let catalog = commands::catalog_for(config.properties.as_deref().unwrap_or_default())?;
            commands::run::execute(catalog, &config).await?;
        }

        Commands::Status { properties } => {
            let catalog = commands::catalog_for(properties)?;
            let store = FileCheckpointStore::new(&config.output_dir);
            commands::status::execute(&catalog, &store)?;
        }

        Commands::List => {
            let catalog = commands::catalog_for(&[])?;
            commands::list::execute(&catalog)?;
        }

        Commands::Eval { property, n, oracle } => {
            commands::apply_oracle_args(&mut config, oracle);
            config.validate()?;
            let catalog = commands::catalog_for(&[])?;
            commands::eval::execute(&catalog, &config, property, *n).await?;
        }
    }

    Ok(())
}

fn setup_logging(log_level: &str) {
    // Set up the logger based on the log level
    let level = match log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new().filter_level(level).init();

    info!("Logger initialized with level: {}", log_level);
}
