//! LocalHub CLI
//!
//! Drives the record store and the feeds from the command line. The backend
//! is chosen from the config file and `LOCALHUB_USE_REMOTE`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use localhub::{
    error::{AppError, Result},
    models::{Category, Config, Draft},
    services::Portal,
    storage::{DEFAULT_RECENT_LIMIT, category_counts},
};
use serde::Serialize;

/// LocalHub - neighborhood portal data layer
#[derive(Parser, Debug)]
#[command(
    name = "localhub",
    version,
    about = "Community portal records, weather and news"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "localhub.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every record of a category
    List { category: Category },

    /// Show one record
    Get { category: Category, id: String },

    /// Create a record from a JSON object
    Add {
        category: Category,
        #[arg(long)]
        json: String,
    },

    /// Merge a JSON object into an existing record
    Update {
        category: Category,
        id: String,
        #[arg(long)]
        json: String,
    },

    /// Delete a record (succeeds if it is already gone)
    Delete { category: Category, id: String },

    /// Case-insensitive search over a category's text fields
    Search { category: Category, term: String },

    /// Records whose own category field matches
    ByCategory {
        category: Category,
        subcategory: String,
    },

    /// Newest records first
    Recent {
        category: Category,
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },

    /// Current weather
    Weather {
        /// Skip the cache
        #[arg(long)]
        refresh: bool,
    },

    /// Latest news
    News {
        /// Skip the cache
        #[arg(long)]
        refresh: bool,
    },

    /// Validate configuration
    Validate,

    /// Show backend and per-category counts
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_draft(category: Category, json: &str) -> Result<Draft> {
    let value = serde_json::from_str(json)
        .map_err(|e| AppError::invalid_payload(category, format!("not valid JSON: {e}")))?;
    Draft::from_json(category, value)
}

/// Check the config and, for the remote backend, its connection settings.
fn validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config OK");

    if config.storage.use_remote {
        let missing = config.missing_remote_settings();
        if !missing.is_empty() {
            log::error!("Missing remote settings: {}", missing.join(", "));
            return Err(AppError::config("remote backend is not fully configured"));
        }
        log::info!("✓ Remote settings present");
    }

    log::info!("All validations passed!");
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();

    if let Command::Validate = cli.command {
        return validate(&config);
    }

    let portal = Portal::from_config(&config).await?;
    let store = portal.store();

    match cli.command {
        Command::List { category } => print_json(&store.get_all_items(category).await)?,

        Command::Get { category, id } => match store.get_item(category, &id).await {
            Some(record) => print_json(&record)?,
            None => return Err(AppError::not_found(category, id)),
        },

        Command::Add { category, json } => {
            let record = store.add_item(parse_draft(category, &json)?).await?;
            print_json(&record)?;
        }

        Command::Update { category, id, json } => {
            let record = store
                .update_item(category, &id, parse_draft(category, &json)?)
                .await?;
            print_json(&record)?;
        }

        Command::Delete { category, id } => {
            store.delete_item(category, &id).await?;
            log::info!("Deleted {} {}", category, id);
        }

        Command::Search { category, term } => {
            print_json(&store.search_items(category, &term).await)?
        }

        Command::ByCategory {
            category,
            subcategory,
        } => print_json(&store.get_items_by_category(category, &subcategory).await)?,

        Command::Recent { category, limit } => {
            print_json(&store.get_recent_items(category, limit).await)?
        }

        Command::Weather { refresh } => {
            let weather = if refresh {
                portal.weather().refresh().await
            } else {
                portal.weather().current_weather().await
            };
            print_json(&weather)?;
        }

        Command::News { refresh } => {
            let news = if refresh {
                portal.news().refresh().await
            } else {
                portal.news().news().await
            };
            print_json(&news)?;
        }

        Command::Info => {
            log::info!("Config file: {}", cli.config.display());
            log::info!("Backend: {}", store.backend_name());
            if !config.storage.use_remote {
                log::info!("Local directory: {}", config.storage.local_dir.display());
            }
            for (category, count) in category_counts(store.as_ref()).await {
                log::info!("{:>16}: {}", category.as_str(), count);
            }
        }

        Command::Validate => validate(&config)?,
    }

    Ok(())
}
