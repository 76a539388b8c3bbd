mod config;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::LedgerClient;
use ledger_api::{HttpIdentity, HttpLedger};
use shared::domain::{Property, PropertyId};
use tracing::info;

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the mirrored catalog, optionally filtered.
    List {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        owned: bool,
        #[arg(long)]
        available: bool,
    },
    /// Find available properties in an inclusive price range.
    Range { min_price: String, max_price: String },
    /// Submit a new property to the ledger.
    Create { name: String, price: String },
    /// Buy a property by id.
    Buy { id: u64 },
    /// Send an inquiry about a property.
    Inquire { id: u64, message: String },
    /// Show the ledger's transaction log.
    History,
}

fn print_properties(properties: &[Property]) {
    if properties.is_empty() {
        println!("no matching properties");
        return;
    }
    for property in properties {
        println!(
            "id={} name={} price={} offer={} owner={}",
            property.id,
            property.name,
            property.price,
            property.listing_label(),
            property.owner
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();
    let settings = config::load_settings();

    let ledger = Arc::new(HttpLedger::with_timeout(
        &settings.ledger_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?);
    let identity = Arc::new(HttpIdentity::new(&settings.ledger_url)?);
    let client = LedgerClient::new(ledger, identity);

    if let Err(err) = client.bootstrap().await {
        eprintln!("initial catalog fetch failed: {err}");
    } else {
        info!(properties = client.properties().len(), "catalog mirrored");
    }

    match cli.command {
        Command::List {
            query,
            owned,
            available,
        } => {
            client.set_search_query(query);
            client.set_owned_only(owned);
            client.set_available_only(available);
            print_properties(&client.filtered_properties());
        }
        Command::Range {
            min_price,
            max_price,
        } => {
            let matches = client.find_in_range(&min_price, &max_price)?;
            print_properties(&matches);
        }
        Command::Create { name, price } => {
            client.submit_create(&name, &price).await?;
            println!("property created: {name}");
        }
        Command::Buy { id } => {
            let message = client.submit_purchase(PropertyId(id)).await?;
            println!("{message}");
        }
        Command::Inquire { id, message } => {
            client.submit_inquiry(PropertyId(id), &message).await?;
            println!("inquiry sent for property id={id}");
        }
        Command::History => {
            for record in client.transaction_history().await? {
                println!(
                    "action={:?} property_id={} name={} price={} actor={} at={}",
                    record.action,
                    record.property_id,
                    record.property_name,
                    record.price,
                    record.actor,
                    record.occurred_at
                );
            }
        }
    }

    Ok(())
}
