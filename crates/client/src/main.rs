//! `storefront-cart` command-line entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use storefront_client::{
    CartConfig, CartStore, HttpStockService, RecordingNotifier, UpdateProductAmount, open_storage,
};
use storefront_core::ProductId;

#[derive(Debug, Parser)]
#[command(name = "storefront-cart", version, about = "Inspect and edit the local storefront cart")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current cart as JSON
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Remove a product's line
    Remove { product_id: ProductId },
    /// Set a product's quantity
    Update {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Delete the stored cart
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let cli = Cli::parse();
    let config = CartConfig::from_env().context("invalid storefront configuration")?;
    let storage = open_storage(&config).context("failed to open cart storage")?;

    if let Command::Clear = cli.command {
        storage
            .remove(&config.storage_key)
            .await
            .context("failed to clear stored cart")?;
        tracing::info!("cleared cart stored under '{}'", config.storage_key);
        return Ok(());
    }

    let stock = HttpStockService::from_config(&config).context("failed to build stock client")?;
    let notifier = Arc::new(RecordingNotifier::new());

    let mut store = CartStore::load(
        config.storage_key.clone(),
        storage,
        Arc::new(stock),
        notifier.clone(),
    )
    .await;

    match cli.command {
        Command::Show | Command::Clear => {}
        Command::Add { product_id } => {
            store.add_product(product_id).await;
        }
        Command::Remove { product_id } => {
            store.remove_product(product_id).await;
        }
        Command::Update { product_id, amount } => {
            store
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await;
        }
    }

    for notice in notifier.drain() {
        eprintln!("{notice}");
    }

    let rendered = serde_json::to_string_pretty(store.cart()).context("failed to render cart")?;
    println!("{rendered}");

    Ok(())
}
