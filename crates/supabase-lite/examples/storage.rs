//! Upload, list, download and remove objects in a bucket.
//!
//! Run with: cargo run --example storage -p supabase-lite
//!
//! Expects an existing public bucket named by EXAMPLE_BUCKET (default `public`).

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
    let bucket = std::env::var("EXAMPLE_BUCKET").unwrap_or_else(|_| "public".to_string());
    let files = client.storage().from(&bucket);

    let upload = files
        .upload(
            "examples/hello.txt",
            b"Hello from supabase-lite".to_vec(),
            FileOptions::new().content_type("text/plain").upsert(true),
        )
        .await?;
    println!("Uploaded {}", upload.key);

    for file in files
        .list("examples", SearchOptions::new().limit(10).sort_by("name", SortOrder::Asc))
        .await?
    {
        println!("  {}", file.name);
    }

    let bytes = files.download("examples/hello.txt").await?;
    println!("Downloaded: {}", String::from_utf8_lossy(&bytes));
    println!("Public URL: {}", files.get_public_url("examples/hello.txt"));

    files.remove(&["examples/hello.txt"]).await?;
    println!("Removed");

    Ok(())
}
