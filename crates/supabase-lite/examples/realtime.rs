//! Subscribe to a realtime channel and print every frame for a while.
//!
//! Run with: cargo run --example realtime -p supabase-lite

use std::time::Duration;

use supabase_lite::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = SupabaseClient::from_env()?;
    let realtime = client.realtime()?;
    realtime.connect().await?;

    realtime
        .subscribe("example-room", |frame| println!("<- {}", frame))
        .await?;
    println!("Subscribed to example-room");

    realtime
        .broadcast("example-room", "greeting", object![("message", "hello")])
        .await?;

    tokio::time::sleep(Duration::from_secs(10)).await;

    realtime.unsubscribe("example-room").await?;
    realtime.disconnect().await?;
    Ok(())
}
