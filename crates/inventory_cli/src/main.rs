//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `inventory_core` linkage and store wiring without the app shell.
//! - Keep output deterministic for quick local sanity checks.

use inventory_core::{Item, ItemStore, StoreConfig};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!("inventory_core ping={}", inventory_core::ping());
    println!("inventory_core version={}", inventory_core::core_version());

    match smoke().await {
        Ok(count) => {
            println!("inventory_core store=ok items={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("inventory_core store=error error={err}");
            ExitCode::FAILURE
        }
    }
}

async fn smoke() -> Result<usize, inventory_core::StoreError> {
    let store = ItemStore::open(StoreConfig::in_memory().with_same_thread(true))?;
    store.insert(&Item::new(1, "Apples", 10.0, 20)).await?;
    store.insert(&Item::new(2, "Bananas", 15.0, 97)).await?;
    let items = store.get_all_items().first().await?;
    store.close()?;
    Ok(items.len())
}
