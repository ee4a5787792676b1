//! highseas - inspect the ships, profile and shop orders a user would see.
//!
//! Reads configuration from `~/.config/highseas/config.json` and the
//! environment (`.env` is honoured). Output is JSON on stdout; logs go to
//! stderr and are controlled with `RUST_LOG`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use highseas_core::api::{AirtableClient, RawRecord};
use highseas_core::cache::JsonFileOrderStore;
use highseas_core::models::Ship;
use highseas_core::shop::StaticShopCatalog;
use highseas_core::{group_ships, Config, DataService};

const USAGE: &str = "\
Usage:
  highseas ships <slack-id> [max-records]   grouped ships for a user
  highseas person <slack-id>                profile for a user
  highseas orders <slack-id>                shop orders for a user
  highseas group <records.json>             group an exported ships table offline";

#[derive(Debug, PartialEq)]
enum Command {
    Ships { slack_id: String, max_records: Option<usize> },
    Person { slack_id: String },
    Orders { slack_id: String },
    Group { path: PathBuf },
}

fn parse_args(args: &[String]) -> Result<Command> {
    let arg = |i: usize, name: &str| -> Result<String> {
        args.get(i)
            .cloned()
            .ok_or_else(|| anyhow!("missing <{}>\n\n{}", name, USAGE))
    };

    match args.first().map(String::as_str) {
        Some("ships") => {
            let max_records = args
                .get(2)
                .map(|s| s.parse::<usize>().with_context(|| format!("invalid max-records: {}", s)))
                .transpose()?;
            Ok(Command::Ships {
                slack_id: arg(1, "slack-id")?,
                max_records,
            })
        }
        Some("person") => Ok(Command::Person {
            slack_id: arg(1, "slack-id")?,
        }),
        Some("orders") => Ok(Command::Orders {
            slack_id: arg(1, "slack-id")?,
        }),
        Some("group") => Ok(Command::Group {
            path: PathBuf::from(arg(1, "records.json")?),
        }),
        Some(other) => bail!("unknown command: {}\n\n{}", other, USAGE),
        None => bail!("{}", USAGE),
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn build_service(config: &Config) -> Result<DataService> {
    let base_id = config
        .airtable_base_id
        .as_deref()
        .ok_or_else(|| anyhow!("No record API base configured (set AIRTABLE_BASE_ID)"))?;
    let api_key = config
        .airtable_api_key
        .as_deref()
        .ok_or_else(|| anyhow!("No record API key (set AIRTABLE_API_KEY)"))?;

    let source = AirtableClient::new(&config.airtable_base_url, base_id, api_key)?;
    let store = JsonFileOrderStore::new(config.order_cache_dir()?)?;
    let catalog = match config.shop_catalog_path {
        Some(ref path) => StaticShopCatalog::from_json_file(path)?,
        None => StaticShopCatalog::default(),
    };

    Ok(DataService::new(
        Arc::new(source),
        Arc::new(store),
        Arc::new(catalog),
        config.service_settings(),
    ))
}

/// Read ship records exported as either a bare array or a list response.
fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let records = match value {
        serde_json::Value::Object(mut page) => page
            .remove("records")
            .ok_or_else(|| anyhow!("{} has no `records` array", path.display()))?,
        other => other,
    };
    Ok(serde_json::from_value(records)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;
    let config = Config::load()?;

    match command {
        Command::Ships { slack_id, max_records } => {
            let service = build_service(&config)?;
            let groups = service.fetch_ships(&slack_id, max_records).await?;
            info!(groups = groups.len(), "Fetched ship groups");
            print_json(&groups)
        }
        Command::Person { slack_id } => {
            let service = build_service(&config)?;
            match service.fetch_person(&slack_id).await? {
                Some(person) => print_json(&person),
                None => bail!("No person record for {}", slack_id),
            }
        }
        Command::Orders { slack_id } => {
            let service = build_service(&config)?;
            let orders = service.get_user_shop_orders(&slack_id).await?;
            print_json(&orders)
        }
        Command::Group { path } => {
            let ships = load_records(&path)?
                .iter()
                .map(Ship::from_record)
                .collect::<Result<Vec<_>, _>>()?;
            print_json(&group_ships(ships, config.orphan_policy))
        }
    }
}
