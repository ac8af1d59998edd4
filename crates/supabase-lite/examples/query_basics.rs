//! Queries, batch writes and RPC against a Supabase project.
//!
//! Run with: cargo run --example query_basics -p supabase-lite
//!
//! Reads SUPABASE_URL and SUPABASE_ANON_KEY (plus the optional SUPABASE_* tuning variables).
//! Expects a `cities(id, name, population)` table and an `add_numbers(a, b)` function.

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
    let postgrest = client.postgrest();

    println!("=== Insert ===");
    postgrest
        .insert_batch(
            "cities",
            vec![
                object![("name", "Lisbon"), ("population", 545_000)],
                object![("name", "Porto"), ("population", 232_000)],
            ],
        )
        .await?;

    println!("=== Large cities ===");
    let query = client
        .from("cities")
        .select("name,population")
        .gt("population", 500_000)
        .order("population", OrderDirection::Descending)
        .range(0, 9)
        .count(CountOption::Exact);
    let response = postgrest.execute(query).await?;
    for row in response.rows() {
        println!("  {}", row);
    }
    println!("  total: {:?}", response.count());

    println!("=== Update ===");
    let query = client.from("cities").eq("name", "Porto");
    postgrest
        .update_batch(query, object![("population", 240_000)])
        .await?;

    println!("=== Delete ===");
    let query = client.from("cities").in_("name", ["Lisbon", "Porto"])?;
    postgrest.delete_batch(query).await?;

    println!("=== RPC ===");
    let sum = postgrest
        .rpc("add_numbers", object![("a", 2), ("b", 3)])
        .await?;
    println!("  add_numbers(2, 3) = {}", sum.data);

    Ok(())
}
