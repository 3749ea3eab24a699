//! Moneydesk main entry point

use clap::Parser;
use moneydesk_api::start_server;
use moneydesk_config::{Config, ConfigError};
use moneydesk_core::Repository;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "moneydesk")]
#[command(version = "0.1.0")]
#[command(about = "Finance web interface with interactive transaction and account tables", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print a default configuration file and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.print_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let loaded = Config::load(args.config.clone());
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    match loaded {
        Ok(_) => log::info!("Config loaded from {}", args.config.display()),
        Err(e @ ConfigError::FileNotFound { .. }) => {
            log::warn!("Using default configuration: {}", e.to_details())
        }
        Err(e) => {
            log::error!("Invalid configuration in {}: {}", args.config.display(), e.to_details());
            return Err(e.into());
        }
    }

    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut repository = Repository::new();
        let dataset_path = config.dataset_path();
        log::info!("Looking for dataset: {}", dataset_path.display());

        // Serve an empty dataset rather than refusing to start
        if let Err(e) = repository.load(dataset_path).await {
            log::warn!("Dataset not loaded: {}", e);
        }

        start_server(config, repository.shared()).await
    })?;

    Ok(())
}
