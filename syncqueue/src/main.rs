mod smoke;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use syncqueue_core::{
    bootstrap::{init_services, load_config},
    logging, Config,
};

#[derive(Parser, Debug)]
#[command(name = "syncqueue")]
#[command(about = "SyncQueue room coordination operator tool", long_about = None)]
struct Args {
    /// Config file path (defaults to SYNCQUEUE_CONFIG_PATH, then ./config.yaml)
    #[arg(long, short, env = "SYNCQUEUE_CONFIG_PATH")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// Print the effective configuration as JSON
    Config,
    /// Run a scripted room session against the configured store
    Smoke {
        /// Skip running migrations before the session
        #[arg(long)]
        no_migrate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load and validate configuration
    let config = load_config(args.config.as_deref())?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;

    match args.command {
        Command::Migrate => {
            if !config.uses_database() {
                return Err(anyhow::anyhow!(
                    "No database configured; set database.url or SYNCQUEUE_DATABASE__URL"
                ));
            }
            init_services(&config, true).await?;
            info!("Database is up to date");
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&redacted(&config))?);
        }
        Command::Smoke { no_migrate } => {
            let services = init_services(&config, !no_migrate).await?;
            info!(store = services.store_kind, "Starting smoke session");
            let room = smoke::run(services.room_service).await?;
            println!("{}", serde_json::to_string_pretty(&room)?);
        }
    }

    Ok(())
}

/// Copy of the config that is safe to print
fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if !config.database.url.is_empty() {
        config.database.url = "<redacted>".to_string();
    }
    config
}
